//! Light adapters: virtual lights and the Hue bridge.

pub mod hue;
pub mod virtual_light;

pub use hue::{HueBridge, HueLight, HueLightCommand};
pub use virtual_light::{VirtualBridge, VirtualLight};
