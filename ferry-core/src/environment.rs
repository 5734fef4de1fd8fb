use serde::Deserialize;
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, AsRefStr)]
pub enum Environment {
    Test,
    Local,
    Development,
    Production,
}
