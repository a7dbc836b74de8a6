pub mod body;
pub mod character;
pub mod core_api;
pub mod database;
pub mod derived;
pub mod effect;
pub mod equipment;
pub mod inventory;
pub mod item;
pub mod modding;
pub mod origin;
pub mod special;
pub mod table;
pub mod weapon;
