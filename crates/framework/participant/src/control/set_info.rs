use super::{Control, ControlContext, ControlError, WriteStatus, not_implemented};
use crate::primitive::PrimitiveId;
use ptf_domain::Capability;
use ptf_domain::units::{CoolingPolicy, Temperature};

/// 200.0 C, the highest indication firmware accepts.
const MAX_DEVICE_TEMPERATURE: Temperature = Temperature::from_deci_kelvin(4732);

/// Participant-specific values pushed down to the platform.
pub trait ParticipantSetSpecificInfo: Control {
    fn set_device_temperature_indication(&self, temperature: Temperature) -> Result<WriteStatus, ControlError>;

    fn set_cooling_policy(&self, policy: CoolingPolicy) -> Result<WriteStatus, ControlError>;
}

#[derive(Debug)]
pub struct ParticipantSetSpecificInfoV0 {
    ctx: ControlContext,
}

impl ParticipantSetSpecificInfoV0 {
    pub const fn new(ctx: ControlContext) -> Self {
        Self { ctx }
    }
}

impl Control for ParticipantSetSpecificInfoV0 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::ParticipantSetSpecificInfo
    }

    fn version(&self) -> u32 {
        0
    }
}

impl ParticipantSetSpecificInfo for ParticipantSetSpecificInfoV0 {
    fn set_device_temperature_indication(&self, _temperature: Temperature) -> Result<WriteStatus, ControlError> {
        Err(not_implemented(self, "set_device_temperature_indication"))
    }

    fn set_cooling_policy(&self, _policy: CoolingPolicy) -> Result<WriteStatus, ControlError> {
        Err(not_implemented(self, "set_cooling_policy"))
    }
}

#[derive(Debug)]
pub struct ParticipantSetSpecificInfoV1 {
    ctx: ControlContext,
}

impl ParticipantSetSpecificInfoV1 {
    pub const fn new(ctx: ControlContext) -> Self {
        Self { ctx }
    }
}

impl Control for ParticipantSetSpecificInfoV1 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::ParticipantSetSpecificInfo
    }

    fn version(&self) -> u32 {
        1
    }
}

impl ParticipantSetSpecificInfo for ParticipantSetSpecificInfoV1 {
    fn set_device_temperature_indication(&self, temperature: Temperature) -> Result<WriteStatus, ControlError> {
        const OPERATION: &str = "ParticipantSetSpecificInfo::set_device_temperature_indication";

        if temperature > MAX_DEVICE_TEMPERATURE {
            return Err(ControlError::InvalidInput {
                operation: OPERATION,
                message: format!("{temperature} exceeds {MAX_DEVICE_TEMPERATURE}").into(),
                context: None,
            });
        }
        Ok(self.ctx.write_u32(PrimitiveId::SetDeviceTemperatureIndication, temperature.deci_kelvin(), OPERATION))
    }

    fn set_cooling_policy(&self, policy: CoolingPolicy) -> Result<WriteStatus, ControlError> {
        Ok(self.ctx.write_u32(
            PrimitiveId::SetCoolingPolicy,
            policy.raw(),
            "ParticipantSetSpecificInfo::set_cooling_policy",
        ))
    }
}
