pub mod decoder;
pub mod scanner;

use bluer::Uuid;

pub use decoder::Channel;
pub use scanner::connect_to_atmotube;

// Atmotube GATT layout
pub const ATMOTUBE_SERVICE_UUID: Uuid = Uuid::from_u128(0xDB450001_8E9A_4818_ADD7_6ED94A328AB4);
pub const SGPC3_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xDB450002_8E9A_4818_ADD7_6ED94A328AB4);
pub const BME280_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xDB450003_8E9A_4818_ADD7_6ED94A328AB4);
pub const STATUS_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xDB450004_8E9A_4818_ADD7_6ED94A328AB4);
pub const PM_CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0xDB450005_8E9A_4818_ADD7_6ED94A328AB4);

/// Map a characteristic UUID to the channel whose decoder handles it
pub fn channel_for(uuid: Uuid) -> Option<Channel> {
    match uuid {
        SGPC3_CHARACTERISTIC_UUID => Some(Channel::Gas),
        BME280_CHARACTERISTIC_UUID => Some(Channel::Environmental),
        STATUS_CHARACTERISTIC_UUID => Some(Channel::Status),
        PM_CHARACTERISTIC_UUID => Some(Channel::Particulate),
        _ => None,
    }
}
