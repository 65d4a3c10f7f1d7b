use std::str::FromStr;

use ethers::types::Address;

pub fn get_env(key: &str, default_value: Option<String>) -> String {
    match default_value {
        Some(value) => std::env::var(key).unwrap_or(value),
        None => std::env::var(key).unwrap_or_else(|_| panic!("expect env {}", key)),
    }
}

pub fn get_env_address(key: &str) -> Address {
    let value = get_env(key, None);
    let Ok(address) = Address::from_str(&value) else {
        panic!("env {} is not a valid address: {:?}", key, value);
    };
    address
}
