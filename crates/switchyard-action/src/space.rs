//! The action-space factory: builds actions bound to a registry and
//! configuration.

use std::sync::Arc;

use tracing::trace;

use switchyard_core::{ActionError, FieldKey, GridConfig, GridRegistry, KeySet};

use crate::action::{ActionClass, TopologyAction};
use crate::input::{ChangeBusInput, FlagInput, SetBusInput};

/// The structured-mapping form of an action: one optional entry per field
/// key, each carrying any accepted setter shape. An absent field means
/// untouched.
///
/// This is what [`ActionSpace::from_update`] consumes and what the
/// serialization codecs decode into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionUpdate {
    /// Busbar assignments.
    pub set_bus: Option<SetBusInput>,
    /// Busbar toggles.
    pub change_bus: Option<ChangeBusInput>,
    /// Load detachment.
    pub detach_load: Option<FlagInput>,
    /// Generator detachment.
    pub detach_gen: Option<FlagInput>,
    /// Storage detachment.
    pub detach_storage: Option<FlagInput>,
}

impl ActionUpdate {
    /// The keys present in this update.
    pub fn keys(&self) -> KeySet {
        let mut keys = KeySet::empty();
        if self.set_bus.is_some() {
            keys.insert(FieldKey::SetBus);
        }
        if self.change_bus.is_some() {
            keys.insert(FieldKey::ChangeBus);
        }
        if self.detach_load.is_some() {
            keys.insert(FieldKey::DetachLoad);
        }
        if self.detach_gen.is_some() {
            keys.insert(FieldKey::DetachGen);
        }
        if self.detach_storage.is_some() {
            keys.insert(FieldKey::DetachStorage);
        }
        keys
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Factory for [`TopologyAction`]s bound to one environment instance.
///
/// Holds the registry and configuration by shared reference and never
/// mutates them; cloning a space is cheap and both clones stay bound to
/// the same registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchyard_action::{ActionClass, ActionSpace};
/// use switchyard_core::{GridConfig, GridLayout, GridRegistry, SlotId};
///
/// let registry = GridRegistry::new(GridLayout {
///     name_load: vec!["load_1_0".into()],
///     name_gen: vec![],
///     name_storage: vec![],
///     name_line: vec!["line_0_1_0".into()],
///     load_pos: vec![SlotId(2)],
///     gen_pos: vec![],
///     storage_pos: vec![],
///     line_or_pos: vec![SlotId(0)],
///     line_ex_pos: vec![SlotId(1)],
///     n_sub: 2,
///     slot_sub: vec![0, 1, 1],
/// })
/// .unwrap();
/// let space = ActionSpace::new(
///     Arc::new(registry),
///     GridConfig::with_detachment(),
///     ActionClass::Complete,
/// );
///
/// let mut action = space.empty();
/// assert!(action.is_empty());
/// action.set_bus([(2u32, -1)]).unwrap();
/// assert_eq!(action.is_ambiguous(), (false, None));
/// ```
#[derive(Clone, Debug)]
pub struct ActionSpace {
    registry: Arc<GridRegistry>,
    config: GridConfig,
    class: ActionClass,
}

impl ActionSpace {
    /// Build a space for one action variant.
    pub fn new(registry: Arc<GridRegistry>, config: GridConfig, class: ActionClass) -> Self {
        Self {
            registry,
            config,
            class,
        }
    }

    /// The registry this space is bound to.
    pub fn registry(&self) -> &Arc<GridRegistry> {
        &self.registry
    }

    /// The environment configuration this space consults.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The action variant this space produces.
    pub fn class(&self) -> ActionClass {
        self.class
    }

    /// The keys actions from this space may use.
    pub fn authorized_keys(&self) -> KeySet {
        self.class.authorized_keys(&self.config)
    }

    /// An action with every field untouched.
    pub fn empty(&self) -> TopologyAction {
        TopologyAction::new(Arc::clone(&self.registry), self.authorized_keys())
    }

    /// Build an action from structured input.
    ///
    /// Every present key is checked against the authorized set before any
    /// field is applied, so an unauthorized key rejects the whole update
    /// without partial mutation. Fields are then applied in declaration
    /// order through the normal setters.
    pub fn from_update(&self, update: ActionUpdate) -> Result<TopologyAction, ActionError> {
        let authorized = self.authorized_keys();
        for key in update.keys().iter() {
            if !authorized.contains(key) {
                return Err(ActionError::UnauthorizedField { key });
            }
        }

        let mut action = self.empty();
        if let Some(input) = update.set_bus {
            action.set_bus(input)?;
        }
        if let Some(input) = update.change_bus {
            action.change_bus(input)?;
        }
        if let Some(input) = update.detach_load {
            action.detach_load(input)?;
        }
        if let Some(input) = update.detach_gen {
            action.detach_gen(input)?;
        }
        if let Some(input) = update.detach_storage {
            action.detach_storage(input)?;
        }
        trace!(%action, "built action from structured update");
        Ok(action)
    }
}
