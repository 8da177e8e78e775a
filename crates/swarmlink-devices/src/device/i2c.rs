use async_trait::async_trait;
use swarmlink_wire::{args, Trigger, SUBSCRIBE};

use super::{CachedValue, Device, DeviceCore};
use crate::error::{Result, SwarmError};

/// Number of registers an ftSwarm exposes as an I2C slave.
pub const REGISTER_COUNT: u8 = 8;

/// Local copy of the register bank.
pub type RegisterBank = [i64; REGISTER_COUNT as usize];

/// The board's I2C slave register bank.
///
/// `register` asks the board; the bank keeps the last value read or written
/// for each register, starting from a full read during initialization.
#[derive(Debug)]
pub struct I2c {
    core: DeviceCore,
    bank: CachedValue<RegisterBank>,
}

impl I2c {
    pub fn new(core: DeviceCore) -> Self {
        Self {
            core,
            bank: CachedValue::new([0; REGISTER_COUNT as usize]),
        }
    }

    pub async fn register(&self, reg: u8) -> Result<i64> {
        check_register(reg)?;
        let value = self.core.query_int("getRegister", args![reg]).await?;
        self.store(reg, value);
        Ok(value)
    }

    pub async fn set_register(&self, reg: u8, value: i64) -> Result<()> {
        check_register(reg)?;
        self.core.execute("setRegister", args![reg, value]).await?;
        self.store(reg, value);
        Ok(())
    }

    /// Last known value of `reg`, without asking the board.
    pub fn cached_register(&self, reg: u8) -> Result<i64> {
        check_register(reg)?;
        Ok(self.bank.get()[usize::from(reg)])
    }

    pub fn registers(&self) -> RegisterBank {
        self.bank.get()
    }

    pub async fn on_trigger(&self, trigger: Trigger, actor_port: &str, value: i64) -> Result<()> {
        self.core
            .execute("onTrigger", args![trigger, actor_port, value])
            .await
    }

    fn store(&self, reg: u8, value: i64) {
        self.bank.update_with(|bank| bank[usize::from(reg)] = value);
    }
}

fn check_register(reg: u8) -> Result<()> {
    if reg < REGISTER_COUNT {
        Ok(())
    } else {
        Err(SwarmError::InvalidRegister(reg))
    }
}

#[async_trait]
impl Device for I2c {
    fn port(&self) -> &str {
        self.core.port()
    }

    fn kind(&self) -> &'static str {
        "i2c"
    }

    async fn initialize(&self) -> Result<()> {
        for reg in 0..REGISTER_COUNT {
            if let Some(value) = self.core.initial_int("getRegister", args![reg]).await? {
                self.store(reg, value);
            }
        }
        self.core.execute(SUBSCRIBE, args![]).await
    }
}
