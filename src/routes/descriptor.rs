//! The declarative route descriptor and its expansion into route entries
//!
//! A [`RouteDescriptor`] names which of the five canonical actions are
//! enabled and how, plus any ad-hoc extra routes. Expansion materializes it
//! into [`RouteEntry`] values, the unit the generator binds one handler to.

use crate::core::naming::RouteName;
use crate::core::plugin::PluginFn;
use crate::core::schema::Schema;

/// HTTP method of a generated route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
        }
    }
}

/// Per-action configuration; every action is enabled unless disabled
#[derive(Clone)]
pub struct ActionConfig {
    pub status: bool,
    pub schema: Option<Schema>,
    pub findable_fields: Vec<String>,
    pub with_pagination: bool,
    pub input_plugins: Vec<PluginFn>,
    pub output_plugins: Vec<PluginFn>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            status: true,
            schema: None,
            findable_fields: Vec::new(),
            with_pagination: false,
            input_plugins: Vec::new(),
            output_plugins: Vec::new(),
        }
    }
}

impl ActionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            status: false,
            ..Self::default()
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn findable_fields(mut self, fields: &[&str]) -> Self {
        self.findable_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_pagination(mut self) -> Self {
        self.with_pagination = true;
        self
    }

    pub fn input_plugin(mut self, plugin: PluginFn) -> Self {
        self.input_plugins.push(plugin);
        self
    }

    pub fn output_plugin(mut self, plugin: PluginFn) -> Self {
        self.output_plugins.push(plugin);
        self
    }
}

/// One fully-resolved route the generator registers
///
/// `name` is the path without the leading slash, using `:id` for the single
/// resource parameter (`widget/:id`).
#[derive(Clone)]
pub struct RouteEntry {
    pub name: String,
    pub method: RouteMethod,
    pub schema: Option<Schema>,
    pub with_pagination: bool,
    pub findable_fields: Vec<String>,
    pub input_plugins: Vec<PluginFn>,
    pub output_plugins: Vec<PluginFn>,
}

impl RouteEntry {
    pub fn new(name: &str, method: RouteMethod) -> Self {
        Self {
            name: name.trim_start_matches('/').to_string(),
            method,
            schema: None,
            with_pagination: false,
            findable_fields: Vec::new(),
            input_plugins: Vec::new(),
            output_plugins: Vec::new(),
        }
    }

    fn from_action(name: &str, method: RouteMethod, config: &ActionConfig) -> Self {
        Self {
            name: name.to_string(),
            method,
            schema: config.schema.clone(),
            with_pagination: config.with_pagination,
            findable_fields: config.findable_fields.clone(),
            input_plugins: config.input_plugins.clone(),
            output_plugins: config.output_plugins.clone(),
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn input_plugin(mut self, plugin: PluginFn) -> Self {
        self.input_plugins.push(plugin);
        self
    }

    pub fn output_plugin(mut self, plugin: PluginFn) -> Self {
        self.output_plugins.push(plugin);
        self
    }

    /// Whether this route addresses a single resource
    pub fn has_id(&self) -> bool {
        self.name.contains(":id")
    }

    /// The axum route path for this entry
    pub fn axum_path(&self) -> String {
        format!("/{}", self.name.replace(":id", "{id}"))
    }
}

/// Declarative description of an entity's generated routes
#[derive(Clone, Default)]
pub struct RouteDescriptor {
    pub name: Option<RouteName>,
    pub list_one: ActionConfig,
    pub list_many: ActionConfig,
    pub create: ActionConfig,
    pub update: ActionConfig,
    pub delete: ActionConfig,
    pub add_route: Vec<RouteEntry>,
}

impl RouteDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the derived route names
    pub fn named(mut self, singular: &str, plural: &str) -> Self {
        self.name = Some(RouteName {
            singular: singular.to_string(),
            plural: plural.to_string(),
        });
        self
    }

    pub fn list_one(mut self, config: ActionConfig) -> Self {
        self.list_one = config;
        self
    }

    pub fn list_many(mut self, config: ActionConfig) -> Self {
        self.list_many = config;
        self
    }

    pub fn create(mut self, config: ActionConfig) -> Self {
        self.create = config;
        self
    }

    pub fn update(mut self, config: ActionConfig) -> Self {
        self.update = config;
        self
    }

    pub fn delete(mut self, config: ActionConfig) -> Self {
        self.delete = config;
        self
    }

    pub fn add_route(mut self, entry: RouteEntry) -> Self {
        self.add_route.push(entry);
        self
    }

    /// Expand enabled actions into route entries, extra routes appended
    pub fn expand(&self, names: &RouteName) -> Vec<RouteEntry> {
        let single = format!("{}/:id", names.singular);
        let mut entries = Vec::new();
        if self.list_one.status {
            entries.push(RouteEntry::from_action(
                &single,
                RouteMethod::Get,
                &self.list_one,
            ));
        }
        if self.list_many.status {
            entries.push(RouteEntry::from_action(
                &names.plural,
                RouteMethod::Get,
                &self.list_many,
            ));
        }
        if self.create.status {
            entries.push(RouteEntry::from_action(
                &names.singular,
                RouteMethod::Post,
                &self.create,
            ));
        }
        if self.update.status {
            entries.push(RouteEntry::from_action(
                &single,
                RouteMethod::Put,
                &self.update,
            ));
        }
        if self.delete.status {
            entries.push(RouteEntry::from_action(
                &single,
                RouteMethod::Delete,
                &self.delete,
            ));
        }
        entries.extend(self.add_route.iter().cloned());
        entries
    }
}
