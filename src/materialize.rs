//! Sequential scene materialization through a remote scene API.
//!
//! The converted tree is replayed one call at a time: every node is created
//! before its children, and every component is created with its scalar
//! fields first and its list fields appended afterwards (the remote side
//! rejects list values at creation time).
//!
//! Top-level objects are sorted into lazily created containers:
//!
//! - tables go under `Tables`
//! - characters go under `Inventory/<location>` (inactive groups), except
//!   characters standing on the table which stay with the other objects
//! - everything else goes under `Objects`
//!
//! A failure while building one object is recorded and the next object is
//! attempted. Objects still referencing a shared asset that could not be
//! created fail the same way, without any call being made for them. A
//! container that fails to be created is remembered, and only the objects
//! that would live in it fail.

use std::collections::{BTreeMap, HashMap};

use anyhow::bail;

use crate::{
    data_structures::{
        scene_graph::{FieldValue, SceneNode, split_fields},
        source::SourceKind,
    },
    dedup::{
        SharedAssets, SharedDefinition, SharedKind, SharedRefs, find_placeholders, is_placeholder,
    },
    error::{ConversionError, MaterializeError},
};

/// Location tag of characters placed on the table.
///
/// Such characters are part of the visible board, so they go under `Objects`
/// with the other pieces instead of an inactive `Inventory` group.
pub const ON_TABLE_LOCATION: &str = "table";
/// Inventory group for characters without a location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// The remote scene. Calls are issued strictly one after another.
#[allow(async_fn_in_trait)]
pub trait SceneApi {
    /// Create a node under `parent_id` and return its id.
    async fn create_node(
        &mut self,
        parent_id: &str,
        name: &str,
        position: [f32; 3],
        scale: Option<[f32; 3]>,
        tag: Option<&str>,
    ) -> anyhow::Result<String>;

    /// Set a node's rotation as Euler angles in degrees.
    async fn set_rotation(&mut self, node_id: &str, euler_degrees: [f32; 3]) -> anyhow::Result<()>;

    async fn set_active(&mut self, node_id: &str, active: bool) -> anyhow::Result<()>;

    /// Create a component with scalar fields only and return its id.
    async fn create_component(
        &mut self,
        node_id: &str,
        component_type: &str,
        fields: &BTreeMap<String, FieldValue>,
    ) -> anyhow::Result<String>;

    /// Append `elements` to a list field and return the ids of the new elements.
    async fn append_list_field_elements(
        &mut self,
        component_id: &str,
        field: &str,
        elements: &[String],
    ) -> anyhow::Result<Vec<String>>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Container {
    Assets,
    SharedKind(SharedKind),
    Tables,
    Objects,
    Inventory,
    Location(String),
}

impl Container {
    fn name(&self) -> String {
        match self {
            Container::Assets => "Assets".to_string(),
            Container::SharedKind(SharedKind::Mesh) => "Meshes".to_string(),
            Container::SharedKind(SharedKind::Material) => "Materials".to_string(),
            Container::SharedKind(SharedKind::Texture) => "Textures".to_string(),
            Container::Tables => "Tables".to_string(),
            Container::Objects => "Objects".to_string(),
            Container::Inventory => "Inventory".to_string(),
            Container::Location(location) => location.clone(),
        }
    }

    fn parent(&self) -> Option<Container> {
        match self {
            Container::SharedKind(_) => Some(Container::Assets),
            Container::Location(_) => Some(Container::Inventory),
            _ => None,
        }
    }

    /// Container a converted top-level object belongs in.
    fn for_root(root: &SceneNode) -> Container {
        match root.source_kind {
            Some(SourceKind::Table) => Container::Tables,
            Some(SourceKind::Character) => match root.tag.as_deref().map(str::trim) {
                Some(ON_TABLE_LOCATION) => Container::Objects,
                Some(location) if !location.is_empty() => Container::Location(location.to_string()),
                _ => Container::Location(UNKNOWN_LOCATION.to_string()),
            },
            _ => Container::Objects,
        }
    }
}

/// Progress after each top-level object.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub object_name: String,
}

/// One top-level object that could not be materialized.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterializeFailure {
    /// Id of the converted node.
    pub object_id: String,
    pub name: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterializeReport {
    pub created_objects: usize,
    pub created_nodes: usize,
    pub failures: Vec<MaterializeFailure>,
}

impl MaterializeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_failure(&mut self, root: &SceneNode, message: impl Into<String>) {
        let message = message.into();
        log::error!("Failed to materialize {} ({}): {message}", root.name, root.id);
        self.failures.push(MaterializeFailure {
            object_id: root.id.clone(),
            name: root.name.clone(),
            message,
        });
    }
}

/// Replays converted scenes into a [`SceneApi`].
pub struct Materializer<'a, A: SceneApi> {
    api: &'a mut A,
    root_id: String,
    containers: HashMap<Container, Result<String, String>>,
}

impl<'a, A: SceneApi> Materializer<'a, A> {
    /// Materialize everything under the node `root_id`.
    pub fn new(api: &'a mut A, root_id: impl Into<String>) -> Self {
        Self {
            api,
            root_id: root_id.into(),
            containers: HashMap::new(),
        }
    }

    /// Id of `container`, creating it (and its parent) on first use.
    /// Failures are remembered so a broken container is attempted once.
    async fn container(&mut self, container: Container) -> Result<String, String> {
        if let Some(result) = self.containers.get(&container) {
            return result.clone();
        }
        let result = self.create_container(&container).await;
        if let Err(message) = &result {
            log::error!("Container {} unavailable: {message}", container.name());
        }
        self.containers.insert(container, result.clone());
        result
    }

    async fn create_container(&mut self, container: &Container) -> Result<String, String> {
        let parent_id = match container.parent() {
            Some(parent) => Box::pin(self.container(parent)).await?,
            None => self.root_id.clone(),
        };
        let id = self
            .api
            .create_node(&parent_id, &container.name(), [0.0; 3], None, None)
            .await
            .map_err(|e| format!("{e:#}"))?;
        if matches!(container, Container::Location(_)) {
            self.api.set_active(&id, false).await.map_err(|e| format!("{e:#}"))?;
        }
        log::debug!("Created container {} ({id}).", container.name());
        Ok(id)
    }

    /// Create one shared definition: a holder node plus the component.
    /// Returns the component id, which is what references point at.
    async fn create_definition(
        &mut self,
        parent_id: &str,
        definition: &SharedDefinition,
    ) -> anyhow::Result<String> {
        let node_id = self
            .api
            .create_node(parent_id, &definition.name, [0.0; 3], None, None)
            .await?;
        let (scalars, lists) = split_fields(&definition.fields);
        let component_id = self
            .api
            .create_component(&node_id, &definition.component_type, &scalars)
            .await?;
        for (field, elements) in lists {
            self.append_list(&component_id, &field, &elements).await?;
        }
        Ok(component_id)
    }

    /// Append list elements and return the ids the remote side assigned,
    /// one per element.
    async fn append_list(
        &mut self,
        component_id: &str,
        field: &str,
        elements: &[String],
    ) -> anyhow::Result<Vec<String>> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self
            .api
            .append_list_field_elements(component_id, field, elements)
            .await?;
        if ids.len() != elements.len() {
            bail!(
                "appending {} element(s) to {field} of {component_id} returned {} id(s)",
                elements.len(),
                ids.len()
            );
        }
        log::debug!("Appended {field} of {component_id}: {ids:?}");
        Ok(ids)
    }

    async fn create_definitions(
        &mut self,
        kind: SharedKind,
        shared: &SharedAssets,
        refs: &mut SharedRefs,
    ) -> Result<(), MaterializeError> {
        let table = shared.table(kind);
        if table.is_empty() {
            return Ok(());
        }
        let container = Container::SharedKind(kind);
        let parent_id = self
            .container(container.clone())
            .await
            .map_err(|message| MaterializeError::Container {
                name: container.name(),
                message,
            })?;
        for definition in table.iter() {
            let pending = definition
                .fields
                .values()
                .flat_map(|value| value.references())
                .any(is_placeholder);
            if pending {
                log::error!(
                    "Skipping shared {} {}: it references an asset that was not created.",
                    kind.as_str(),
                    definition.name
                );
                continue;
            }
            match self.create_definition(&parent_id, definition).await {
                Ok(id) => refs.insert(kind, definition.signature.clone(), id),
                Err(e) => log::error!(
                    "Failed to create shared {} {}: {e:#}",
                    kind.as_str(),
                    definition.name
                ),
            }
        }
        Ok(())
    }

    /// Create every shared texture, material and mesh, in that order, and
    /// return the signature-to-id mapping.
    ///
    /// Materials have their texture placeholders resolved first. Definitions
    /// that fail are left out of the mapping; nodes using them are caught
    /// when placeholders are resolved.
    pub async fn create_shared_definitions(
        &mut self,
        shared: &mut SharedAssets,
    ) -> Result<SharedRefs, MaterializeError> {
        let mut refs = SharedRefs::default();
        self.create_definitions(SharedKind::Texture, shared, &mut refs).await?;
        if let Err(e) = shared.materials.resolve_references(&refs) {
            log::warn!("{e}");
        }
        self.create_definitions(SharedKind::Material, shared, &mut refs).await?;
        self.create_definitions(SharedKind::Mesh, shared, &mut refs).await?;
        log::info!(
            "Created {} texture(s), {} material(s), {} mesh(es).",
            refs.textures.len(),
            refs.materials.len(),
            refs.meshes.len()
        );
        Ok(refs)
    }

    /// Create `root` and its subtree under `parent_id`, parents first.
    /// Returns the number of nodes created.
    async fn build_tree(&mut self, parent_id: &str, root: &SceneNode) -> anyhow::Result<usize> {
        let mut pending: Vec<(String, &SceneNode)> = vec![(parent_id.to_string(), root)];
        let mut created = 0;
        while let Some((parent_id, node)) = pending.pop() {
            let id = self.build_node(&parent_id, node).await?;
            created += 1;
            for child in node.children.iter().rev() {
                pending.push((id.clone(), child));
            }
        }
        Ok(created)
    }

    async fn build_node(&mut self, parent_id: &str, node: &SceneNode) -> anyhow::Result<String> {
        let transform = &node.transform;
        let scale: Option<[f32; 3]> = (!transform.is_unit_scale()).then(|| transform.scale.into());
        let id = self
            .api
            .create_node(
                parent_id,
                &node.name,
                transform.position.into(),
                scale,
                node.tag.as_deref(),
            )
            .await?;
        if !transform.is_identity_rotation() {
            self.api.set_rotation(&id, transform.rotation.into()).await?;
        }
        if !node.active {
            self.api.set_active(&id, false).await?;
        }
        for component in &node.components {
            let (scalars, lists) = component.split_fields();
            let component_id = self
                .api
                .create_component(&id, &component.component_type, &scalars)
                .await?;
            for (field, elements) in lists {
                self.append_list(&component_id, &field, &elements).await?;
            }
        }
        log::debug!(
            "Created node {} ({id}) with {} component(s).",
            node.name,
            node.components.len()
        );
        Ok(id)
    }

    /// Build one top-level object in its container and return the number of
    /// nodes created.
    async fn materialize_root(&mut self, root: &SceneNode) -> Result<usize, String> {
        let pending = find_placeholders(std::slice::from_ref(root));
        if !pending.is_empty() {
            return Err(ConversionError::UnresolvedPlaceholders(pending).to_string());
        }
        let container = Container::for_root(root);
        let parent_id = self
            .container(container.clone())
            .await
            .map_err(|message| format!("container {} unavailable: {message}", container.name()))?;
        self.build_tree(&parent_id, root)
            .await
            .map_err(|e| format!("{e:#}"))
    }

    /// Materialize every top-level object into its container.
    ///
    /// Never fails as a whole: per-object failures end up in the report and
    /// `progress` is called once per object either way. Objects that still
    /// hold placeholders are reported without being replayed.
    pub async fn materialize_roots(
        &mut self,
        roots: &[SceneNode],
        mut progress: impl FnMut(&Progress),
    ) -> MaterializeReport {
        let mut report = MaterializeReport::default();
        for (index, root) in roots.iter().enumerate() {
            match self.materialize_root(root).await {
                Ok(created) => {
                    report.created_objects += 1;
                    report.created_nodes += created;
                }
                Err(message) => report.record_failure(root, message),
            }
            let update = Progress {
                completed: index + 1,
                total: roots.len(),
                object_name: root.name.clone(),
            };
            log::info!(
                "Materialized {}/{}: {}",
                update.completed,
                update.total,
                update.object_name
            );
            progress(&update);
        }
        report
    }
}
