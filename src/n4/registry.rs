//! Identity registration for the entities of one snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use crate::error::KetraError;

/// Command class an entity registers under. Ids are unique per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// Switched or dimmed loads.
    Load,
    /// Keypads and other non-load devices.
    Device,
}

/// An entity that can be registered: a stable id plus a display name the
/// registry may rewrite once to keep names unique.
pub trait Addressable: Send + Sync {
    fn uid(&self) -> &str;
    fn name(&self) -> String;
    fn set_name(&self, name: String);
}

/// Two-level entity map built during a snapshot parse.
///
/// Ids are unique within a command class, display names are unique across
/// the whole registry. The registry is only written during the
/// single-threaded parse phase and read-only afterwards; it only grows for
/// the lifetime of one snapshot.
#[derive(Default)]
pub struct DeviceRegistry {
    ids: HashMap<CommandClass, HashMap<String, Arc<dyn Addressable>>>,
    names: HashMap<String, String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under a command class.
    ///
    /// A duplicate id within the class is fatal to this registration. A
    /// colliding display name is resolved by probing "Name 2", "Name 3", …
    /// and the resolved name is written back onto the entity.
    pub fn register(
        &mut self,
        class: CommandClass,
        entity: Arc<dyn Addressable>,
    ) -> Result<(), KetraError> {
        let ids = self.ids.entry(class).or_default();
        let uid = entity.uid().to_owned();
        if ids.contains_key(&uid) {
            return Err(KetraError::IdExists(uid));
        }

        let trimmed = entity.name().trim().to_owned();
        let mut resolved = trimmed.clone();
        if self.names.contains_key(&resolved) {
            let mut suffix = 2;
            loop {
                resolved = format!("{trimmed} {suffix}");
                if !self.names.contains_key(&resolved) {
                    break;
                }
                suffix += 1;
            }
            warn!("Repeated name `{trimmed}' - using `{resolved}'");
        }
        entity.set_name(resolved.clone());

        self.names.insert(resolved, uid.clone());
        ids.insert(uid, entity);
        Ok(())
    }

    /// Look up an entity by command class and id.
    pub fn get(&self, class: CommandClass, uid: &str) -> Option<&Arc<dyn Addressable>> {
        self.ids.get(&class)?.get(uid)
    }

    /// Look up the id owning a display name.
    pub fn uid_for_name(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TestEntity {
        uid: String,
        name: Mutex<String>,
    }

    impl TestEntity {
        fn new(uid: &str, name: &str) -> Arc<Self> {
            Arc::new(Self {
                uid: uid.to_owned(),
                name: Mutex::new(name.to_owned()),
            })
        }
    }

    impl Addressable for TestEntity {
        fn uid(&self) -> &str {
            &self.uid
        }

        fn name(&self) -> String {
            self.name.lock().unwrap().clone()
        }

        fn set_name(&self, name: String) {
            *self.name.lock().unwrap() = name;
        }
    }

    #[test]
    fn duplicate_id_in_a_class_is_fatal() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(CommandClass::Load, TestEntity::new("A", "One"))
            .unwrap();

        let result = registry.register(CommandClass::Load, TestEntity::new("A", "Two"));
        assert!(matches!(result, Err(KetraError::IdExists(uid)) if uid == "A"));
    }

    #[test]
    fn same_id_in_another_class_is_fine() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(CommandClass::Load, TestEntity::new("A", "One"))
            .unwrap();
        registry
            .register(CommandClass::Device, TestEntity::new("A", "Keypad One"))
            .unwrap();

        assert!(registry.get(CommandClass::Load, "A").is_some());
        assert!(registry.get(CommandClass::Device, "A").is_some());
    }

    #[test]
    fn colliding_names_get_numeric_suffixes() {
        let mut registry = DeviceRegistry::new();
        let first = TestEntity::new("1", "Kitchen");
        let second = TestEntity::new("2", "Kitchen");
        let third = TestEntity::new("3", "Kitchen");

        registry.register(CommandClass::Load, first.clone()).unwrap();
        registry.register(CommandClass::Load, second.clone()).unwrap();
        registry.register(CommandClass::Load, third.clone()).unwrap();

        assert_eq!(first.name(), "Kitchen");
        assert_eq!(second.name(), "Kitchen 2");
        assert_eq!(third.name(), "Kitchen 3");
        assert_eq!(registry.uid_for_name("Kitchen 3"), Some("3"));
    }

    #[test]
    fn names_are_trimmed_before_uniqueness_checks() {
        let mut registry = DeviceRegistry::new();
        let first = TestEntity::new("1", " Pendant ");
        let second = TestEntity::new("2", "Pendant");

        registry.register(CommandClass::Load, first.clone()).unwrap();
        registry.register(CommandClass::Load, second.clone()).unwrap();

        assert_eq!(first.name(), "Pendant");
        assert_eq!(second.name(), "Pendant 2");
    }
}
