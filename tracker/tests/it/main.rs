#![deny(warnings)]
#![deny(rust_2018_idioms)]

use config::{Config, File};
use ferry_core::Environment;
use tracker::settings::Settings;

pub mod engine;
pub mod helper;

#[test]
fn test_local_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/local.yml").required(true))
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    assert_eq!(settings.environment, Environment::Local);
}

#[test]
fn test_development_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/development.yml").required(true))
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    assert_eq!(settings.environment, Environment::Development);
}

#[test]
fn test_production_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/production.yml").required(true))
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    assert_eq!(settings.environment, Environment::Production);
}

#[test]
fn test_environment_parses_from_str() {
    assert_eq!("Local".parse::<Environment>().unwrap(), Environment::Local);
    assert_eq!("Test".parse::<Environment>().unwrap(), Environment::Test);
}
