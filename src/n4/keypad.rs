//! Keypads and their buttons.
//!
//! These are model types only: the controller reports keypads, but no
//! button event dispatch exists in this client.

use std::fmt;
use std::sync::Mutex;

use crate::n4::registry::Addressable;

/// A keypad button. Hybrid keypads have dimmer buttons with no engraving,
/// so those are named after their direction.
pub struct Button {
    name: String,
    number: u32,
    button_type: String,
    direction: String,
}

impl Button {
    pub fn new(engraving: Option<&str>, number: u32, button_type: &str, direction: &str) -> Self {
        let mut name = engraving.unwrap_or_default().to_owned();
        if button_type == "SingleSceneRaiseLower" {
            name = format!("Dimmer {direction}");
        }
        if name.is_empty() {
            name = "Unknown Button".to_owned();
        }
        Self {
            name,
            number,
            button_type: button_type.to_owned(),
            direction: direction.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The button type (Toggle, MasterRaiseLower, etc.).
    pub fn button_type(&self) -> &str {
        &self.button_type
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Button name: \"{}\" num: {}", self.name, self.number)
    }
}

/// A keypad device and its buttons.
pub struct Keypad {
    uid: String,
    name: Mutex<String>,
    area: String,
    buttons: Vec<Button>,
}

impl Keypad {
    pub fn new(name: &str, area: &str, uid: &str, buttons: Vec<Button>) -> Self {
        Self {
            uid: uid.to_owned(),
            name: Mutex::new(name.to_owned()),
            area: area.to_owned(),
            buttons,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> String {
        self.name.lock().expect("name poisoned").clone()
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }
}

impl Addressable for Keypad {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> String {
        self.name()
    }

    fn set_name(&self, name: String) {
        *self.name.lock().expect("name poisoned") = name;
    }
}

impl fmt::Display for Keypad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keypad name: \"{}\", area: \"{}\", id: {}",
            self.name(),
            self.area,
            self.uid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::n4::registry::{CommandClass, DeviceRegistry};
    use std::sync::Arc;

    #[test]
    fn keypads_register_under_the_device_class() {
        let mut registry = DeviceRegistry::new();
        let keypad = Arc::new(Keypad::new(
            " Hall Keypad ",
            "Hall",
            "KC00000255",
            vec![Button::new(Some("Get to Work"), 1, "Toggle", "")],
        ));
        registry
            .register(CommandClass::Device, keypad.clone())
            .unwrap();

        assert_eq!(keypad.name(), "Hall Keypad");
        assert!(registry.get(CommandClass::Device, "KC00000255").is_some());
        assert_eq!(keypad.buttons().len(), 1);
    }

    #[test]
    fn dimmer_buttons_are_named_after_their_direction() {
        let button = Button::new(None, 3, "SingleSceneRaiseLower", "Up");
        assert_eq!(button.name(), "Dimmer Up");

        // the dimmer rule overrides an engraving too
        let button = Button::new(Some("Scene"), 4, "SingleSceneRaiseLower", "Down");
        assert_eq!(button.name(), "Dimmer Down");
    }

    #[test]
    fn unengraved_buttons_get_a_fallback_name() {
        let button = Button::new(None, 1, "Toggle", "");
        assert_eq!(button.name(), "Unknown Button");

        let button = Button::new(Some("Get to Work"), 2, "Toggle", "");
        assert_eq!(button.name(), "Get to Work");
    }
}
