//! Enterprise administration: users, groups, invitations, apps, unit tests,
//! and announcement banners.

use crate::client::flowpilot_client::{require, FlowpilotClient};
use crate::client::flows::YAML_CONTENT_TYPE;
use crate::error::{FlowpilotError, Result};
use flowpilot_core::client::ApiRequest;
use flowpilot_core::pagination::page_items;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

const LOOKUP_PAGE_SIZE: usize = 10;

/// Built-in IAM roles. The engine names the role of each tenant `<role>_<tenant>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IamRole {
    Admin,
    Developer,
    Editor,
    Launcher,
    Viewer,
}

impl IamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Developer => "developer",
            Self::Editor => "editor",
            Self::Launcher => "launcher",
            Self::Viewer => "viewer",
        }
    }

    fn role_id(&self, tenant: &str) -> String {
        format!("{}_{}", self.as_str(), tenant)
    }
}

/// An invitation for a new user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInvite {
    pub email: String,
    /// Groups to add the user to, by name
    pub group_names: Vec<String>,
    pub role: Option<IamRole>,
}

impl UserInvite {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.group_names.push(name.into());
        self
    }

    pub fn role(mut self, role: IamRole) -> Self {
        self.role = Some(role);
        self
    }
}

/// An action on a unit test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestAction {
    /// Create the test from YAML, updating it when it already exists
    Create { yaml: String },
    Run { namespace: String, id: String },
    Delete { namespace: String, id: String },
}

/// An action on an app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Create the app from YAML, updating it when it already exists
    Create { yaml: String },
    Enable { uid: String },
    Disable { uid: String },
    Delete { uid: String },
}

/// Filters for [`FlowpilotClient::search_apps`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSearch {
    pub page: u32,
    pub size: usize,
    pub sort: Vec<String>,
    pub tags: Vec<String>,
    pub q: Option<String>,
    pub namespace: Option<String>,
    pub flow_id: Option<String>,
}

impl Default for AppSearch {
    fn default() -> Self {
        Self {
            page: 1,
            size: LOOKUP_PAGE_SIZE,
            sort: Vec::new(),
            tags: Vec::new(),
            q: None,
            namespace: None,
            flow_id: None,
        }
    }
}

impl AppSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort.push(field.into());
        self
    }

    pub fn page(mut self, page: u32, size: usize) -> Self {
        self.page = page;
        self.size = size;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Standard,
    ServiceAccount,
    SuperAdmin,
}

impl UserType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::ServiceAccount => "SERVICE_ACCOUNT",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

/// Filters for [`FlowpilotClient::search_users`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearch {
    pub q: Option<String>,
    pub page: u32,
    pub size: usize,
    pub sort: Vec<String>,
    pub user_type: Option<UserType>,
}

impl Default for UserSearch {
    fn default() -> Self {
        Self {
            q: None,
            page: 1,
            size: LOOKUP_PAGE_SIZE,
            sort: Vec::new(),
            user_type: None,
        }
    }
}

impl UserSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sort.push(field.into());
        self
    }

    pub fn page(mut self, page: u32, size: usize) -> Self {
        self.page = page;
        self.size = size;
        self
    }
}

/// An action on a user group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    /// Create the group, or reuse one with the same name. An optional role is
    /// bound to the group afterwards.
    Create {
        name: String,
        description: Option<String>,
        role: Option<IamRole>,
    },
    Get { id: String },
    Update {
        id: String,
        name: String,
        description: String,
    },
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Get,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnouncementType {
    Info,
    Warning,
    Error,
}

/// Content of an announcement banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnnouncementType>,
    /// ISO-8601 start of the display window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Announcement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            start_date: None,
            end_date: None,
            active: true,
            tenant_id: None,
        }
    }

    pub fn kind(mut self, kind: AnnouncementType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn window(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// An update replaces the whole banner, so every field must be present.
    fn validate_for_update(&self) -> Result<()> {
        let complete = !self.message.trim().is_empty()
            && self.kind.is_some()
            && self.start_date.as_deref().is_some_and(|d| !d.is_empty())
            && self.end_date.as_deref().is_some_and(|d| !d.is_empty());
        if complete {
            Ok(())
        } else {
            Err(FlowpilotError::MissingArgument(
                "updating an announcement requires `message`, `type`, `startDate`, and `endDate`"
                    .to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementAction {
    List,
    Create(Announcement),
    Update { id: String, announcement: Announcement },
    Delete { id: String },
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn yaml_field(doc: &serde_yaml::Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(serde_yaml::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl FlowpilotClient {
    fn tenant_for_role(&self) -> Result<&str> {
        self.config
            .tenant_id
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                FlowpilotError::InvalidConfiguration(
                    "a tenant id is required to assign a role".to_string(),
                )
            })
    }

    /// Look up a group by exact name among the first page of search hits.
    async fn find_group(&self, name: &str) -> Result<Option<Value>> {
        let body: Value = self
            .fetch_json(
                ApiRequest::get("/groups/search")
                    .query("q", name)
                    .query("page", 1)
                    .query("size", LOOKUP_PAGE_SIZE),
            )
            .await?;
        let groups: Vec<Value> = page_items(body)?;
        Ok(groups
            .into_iter()
            .find(|g| g.get("name").and_then(Value::as_str) == Some(name)))
    }

    /// Invite a user to the tenant, optionally into groups and with a role.
    ///
    /// When an invitation already exists for the email, the most recent one is
    /// returned and nothing is created.
    pub async fn invite_user(&self, invite: &UserInvite) -> Result<Value> {
        require("email", &invite.email)?;

        let existing = self
            .send(ApiRequest::get(format!("/invitations/email/{}", invite.email)))
            .await?;
        if existing.status != 404 {
            let invitations: Vec<Value> =
                page_items(existing.error_for_status()?.json_or_empty()?)?;
            if let Some(latest) = invitations.into_iter().next() {
                debug!(email = %invite.email, "Invitation already exists");
                return Ok(latest);
            }
        }

        let mut group_ids = Vec::with_capacity(invite.group_names.len());
        for name in &invite.group_names {
            let group = self
                .find_group(name)
                .await?
                .ok_or_else(|| FlowpilotError::NotFound(format!("Group '{}' not found.", name)))?;
            let id = string_field(&group, "id").ok_or_else(|| {
                FlowpilotError::NotFound(format!("Group '{}' has no id.", name))
            })?;
            group_ids.push(id);
        }

        let bindings = match invite.role {
            Some(role) => vec![json!({
                "type": "USER",
                "roleId": role.role_id(self.tenant_for_role()?),
                "deleted": false,
            })],
            None => Vec::new(),
        };

        let created: Value = self
            .fetch_json(ApiRequest::post("/invitations").json(&json!({
                "email": invite.email,
                "userType": UserType::Standard.as_str(),
                "groupIds": group_ids,
                "bindings": bindings,
            }))?)
            .await?;
        info!(email = %invite.email, groups = group_ids.len(), "Invited user");
        Ok(created)
    }

    /// Get or delete an invitation.
    pub async fn manage_invitations(&self, action: InvitationAction, id: &str) -> Result<Value> {
        require("id", id)?;
        let path = format!("/invitations/{}", id);
        match action {
            InvitationAction::Get => self.fetch_json(ApiRequest::get(path)).await,
            InvitationAction::Delete => {
                let body = self.fetch_lenient(ApiRequest::delete(path)).await?;
                info!(id, "Deleted invitation");
                Ok(body)
            }
        }
    }

    /// Search users. Each entry of a user's `groupList` gains the group's name
    /// as `groupName`.
    pub async fn search_users(&self, search: &UserSearch) -> Result<Value> {
        let mut request = ApiRequest::get("/users/search")
            .query("page", search.page)
            .query("size", search.size)
            .query_opt("q", search.q.as_deref().filter(|q| !q.is_empty()))
            .query_opt("type", search.user_type.map(|t| t.as_str()));
        for field in &search.sort {
            request = request.query("sort", field);
        }
        let mut body: Value = self.fetch_json(request).await?;

        let mut names: HashMap<String, Option<String>> = HashMap::new();
        let users = body
            .get_mut("results")
            .and_then(Value::as_array_mut)
            .map(|users| users.iter_mut())
            .into_iter()
            .flatten();
        for user in users {
            let Some(groups) = user.get_mut("groupList").and_then(Value::as_array_mut) else {
                continue;
            };
            for group in groups.iter_mut() {
                let Some(group_id) = string_field(group, "groupId") else {
                    continue;
                };
                let name = match names.get(&group_id) {
                    Some(name) => name.clone(),
                    None => {
                        let info: Value = self
                            .fetch_json(ApiRequest::get(format!("/groups/{}", group_id)))
                            .await?;
                        let name = string_field(&info, "name");
                        names.insert(group_id, name.clone());
                        name
                    }
                };
                if let Some(obj) = group.as_object_mut() {
                    obj.insert("groupName".to_string(), name.map_or(Value::Null, Value::String));
                }
            }
        }
        Ok(body)
    }

    /// Apply a [`GroupAction`].
    pub async fn manage_group(&self, action: GroupAction) -> Result<Value> {
        match action {
            GroupAction::Create {
                name,
                description,
                role,
            } => self.create_group(&name, description.as_deref(), role).await,
            GroupAction::Get { id } => {
                require("id", &id)?;
                self.fetch_json(ApiRequest::get(format!("/groups/{}", id)))
                    .await
            }
            GroupAction::Update {
                id,
                name,
                description,
            } => {
                require("id", &id)?;
                require("name", &name)?;
                require("description", &description)?;
                let updated: Value = self
                    .fetch_json(ApiRequest::put(format!("/groups/{}", id)).json(&json!({
                        "id": id,
                        "name": name,
                        "description": description,
                    }))?)
                    .await?;
                info!(id = %id, name = %name, "Updated group");
                Ok(updated)
            }
            GroupAction::Delete { id } => {
                require("id", &id)?;
                let body = self
                    .fetch_lenient(ApiRequest::delete(format!("/groups/{}", id)))
                    .await?;
                info!(id = %id, "Deleted group");
                Ok(body)
            }
        }
    }

    async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        role: Option<IamRole>,
    ) -> Result<Value> {
        require("name", name)?;
        let description = description.filter(|d| !d.is_empty());
        // Checked before anything is created.
        let role_id = match role {
            Some(role) => Some(role.role_id(self.tenant_for_role()?)),
            None => None,
        };

        let created = self
            .send(ApiRequest::post("/groups").json(&json!({
                "name": name,
                "description": description.unwrap_or_default(),
                "deleted": false,
                "provider": {},
                "attributes": {},
            }))?)
            .await?;
        let group = if created.status == 422 {
            warn!(name, "Group exists, reusing it");
            let existing = self.find_group(name).await?.ok_or_else(|| {
                FlowpilotError::NotFound(format!("Group '{}' not found after 422 error", name))
            })?;
            match description {
                Some(description) => self.refresh_group(&existing, name, description).await?,
                None => existing,
            }
        } else {
            created.error_for_status()?.parse::<Value>()?
        };

        let group_id = string_field(&group, "id")
            .ok_or_else(|| FlowpilotError::NotFound(format!("Group '{}' has no id.", name)))?;
        if let Some(role_id) = role_id {
            self.bind_group_role(&group_id, &role_id).await?;
        }
        info!(id = %group_id, name, "Saved group");
        Ok(group)
    }

    /// Overwrite an existing group's description, keeping its provider data.
    async fn refresh_group(
        &self,
        existing: &Value,
        name: &str,
        description: &str,
    ) -> Result<Value> {
        let id = string_field(existing, "id")
            .ok_or_else(|| FlowpilotError::NotFound(format!("Group '{}' has no id.", name)))?;
        let inherited = |key: &str, fallback: Value| existing.get(key).cloned().unwrap_or(fallback);
        let body = json!({
            "id": id,
            "name": name,
            "description": description,
            "deleted": false,
            "provider": inherited("provider", Value::Object(Map::new())),
            "attributes": inherited("attributes", Value::Object(Map::new())),
            "externalId": inherited("externalId", json!("")),
            "securityIntegrationId": inherited("securityIntegrationId", json!("")),
            "securityIntegrationName": inherited("securityIntegrationName", json!("")),
        });
        self.fetch_json(ApiRequest::put(format!("/groups/{}", id)).json(&body)?)
            .await
    }

    /// Bind a role to a group unless the binding already exists. A binding
    /// search that answers 404 skips the role entirely.
    async fn bind_group_role(&self, group_id: &str, role_id: &str) -> Result<()> {
        let search = self
            .send(
                ApiRequest::get("/bindings/search")
                    .query("type", "GROUP")
                    .query("id", group_id)
                    .query("page", 1)
                    .query("size", LOOKUP_PAGE_SIZE),
            )
            .await?;
        if search.status == 404 {
            debug!(group_id, "Binding search unavailable, skipping role");
            return Ok(());
        }
        let bindings: Vec<Value> = page_items(search.error_for_status()?.json_or_empty()?)?;
        if bindings
            .iter()
            .any(|b| b.get("roleId").and_then(Value::as_str) == Some(role_id))
        {
            debug!(group_id, role_id, "Role already bound");
            return Ok(());
        }

        let created = self
            .send(ApiRequest::post("/bindings").json(&json!({
                "type": "GROUP",
                "externalId": group_id,
                "roleId": role_id,
                "deleted": false,
            }))?)
            .await?;
        if !matches!(created.status, 409 | 422) {
            created.error_for_status()?;
        }
        info!(group_id, role_id, "Bound role to group");
        Ok(())
    }

    /// Apply a [`TestAction`] to a unit test.
    pub async fn manage_tests(&self, action: TestAction) -> Result<Value> {
        match action {
            TestAction::Create { yaml } => self.save_test(&yaml).await,
            TestAction::Run { namespace, id } => {
                require("namespace", &namespace)?;
                require("id", &id)?;
                let report: Value = self
                    .fetch_json(ApiRequest::post(format!("/tests/{}/{}/run", namespace, id)))
                    .await?;
                info!(namespace = %namespace, id = %id, "Ran test");
                Ok(report)
            }
            TestAction::Delete { namespace, id } => {
                require("namespace", &namespace)?;
                require("id", &id)?;
                let body = self
                    .fetch_lenient(ApiRequest::delete(format!("/tests/{}/{}", namespace, id)))
                    .await?;
                info!(namespace = %namespace, id = %id, "Deleted test");
                Ok(body)
            }
        }
    }

    async fn save_test(&self, yaml: &str) -> Result<Value> {
        require("yaml_source", yaml)?;
        let created = self
            .send(ApiRequest::post("/tests").raw(yaml, YAML_CONTENT_TYPE))
            .await?;
        if !matches!(created.status, 409 | 422) {
            let body = created.error_for_status()?.json_or_empty()?;
            info!("Created test");
            return Ok(body);
        }

        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let (namespace, id) = match (yaml_field(&doc, "namespace"), yaml_field(&doc, "id")) {
            (Some(ns), Some(id)) => (ns, id),
            _ => {
                return Err(FlowpilotError::InvalidArgument(
                    "YAML must include 'namespace' and 'id' fields for update".to_string(),
                ))
            }
        };
        warn!(
            namespace = %namespace,
            id = %id,
            status = created.status,
            "Test exists, updating instead"
        );
        let body = self
            .send_ok(
                ApiRequest::put(format!("/tests/{}/{}", namespace, id))
                    .raw(yaml, YAML_CONTENT_TYPE),
            )
            .await?
            .json_or_empty()?;
        info!(namespace = %namespace, id = %id, "Updated test");
        Ok(body)
    }

    /// Apply an [`AppAction`] to an app.
    pub async fn manage_apps(&self, action: AppAction) -> Result<Value> {
        let (request, uid, verb) = match action {
            AppAction::Create { yaml } => return self.save_app(&yaml).await,
            AppAction::Enable { uid } => {
                (ApiRequest::post(format!("/apps/{}/enable", uid)), uid, "enable")
            }
            AppAction::Disable { uid } => {
                (ApiRequest::post(format!("/apps/{}/disable", uid)), uid, "disable")
            }
            AppAction::Delete { uid } => {
                (ApiRequest::delete(format!("/apps/{}", uid)), uid, "delete")
            }
        };
        require("uid", &uid)?;
        let body = self.fetch_lenient(request).await?;
        info!(uid = %uid, action = verb, "Changed app");
        Ok(body)
    }

    async fn save_app(&self, yaml: &str) -> Result<Value> {
        require("yaml_source", yaml)?;
        let created = self
            .send(ApiRequest::post("/apps").raw(yaml, YAML_CONTENT_TYPE))
            .await?;
        if !matches!(created.status, 409 | 422) {
            let body = created.error_for_status()?.json_or_empty()?;
            info!("Created app");
            return Ok(body);
        }

        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let (id, namespace) = match (yaml_field(&doc, "id"), yaml_field(&doc, "namespace")) {
            (Some(id), Some(ns)) => (id, ns),
            _ => {
                return Err(FlowpilotError::InvalidArgument(
                    "YAML must include 'id' and 'namespace' fields for update".to_string(),
                ))
            }
        };
        let mut search = AppSearch::new().query(&id).namespace(&namespace);
        search.flow_id = yaml_field(&doc, "flowId");
        let existing = page_items::<Value>(self.search_apps(&search).await?)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                FlowpilotError::NotFound(format!(
                    "Could not find existing app with id '{}' in namespace '{}'",
                    id, namespace
                ))
            })?;
        let uid = string_field(&existing, "uid").ok_or_else(|| {
            FlowpilotError::InvalidArgument("existing app has no 'uid' to update".to_string())
        })?;

        warn!(uid = %uid, status = created.status, "App exists, updating instead");
        let updated = self
            .send(ApiRequest::put(format!("/apps/{}", uid)).raw(yaml, YAML_CONTENT_TYPE))
            .await?;
        if updated.status == 304 {
            debug!(uid = %uid, "App unchanged");
            return Ok(existing);
        }
        let body = updated.error_for_status()?.json_or_empty()?;
        info!(uid = %uid, "Updated app");
        Ok(body)
    }

    /// Search apps by text, namespace, flow, or tags.
    pub async fn search_apps(&self, search: &AppSearch) -> Result<Value> {
        let mut request = ApiRequest::get("/apps/search")
            .query("page", search.page)
            .query("size", search.size)
            .query_opt("q", search.q.as_deref().filter(|q| !q.is_empty()))
            .query_opt("namespace", search.namespace.as_deref().filter(|n| !n.is_empty()))
            .query_opt("flowId", search.flow_id.as_deref().filter(|f| !f.is_empty()));
        for field in &search.sort {
            request = request.query("sort", field);
        }
        for tag in &search.tags {
            request = request.query("tags", tag);
        }
        self.fetch_json(request).await
    }

    /// Apply an [`AnnouncementAction`]. Banners are instance-wide, outside
    /// the tenant prefix.
    pub async fn manage_announcements(&self, action: AnnouncementAction) -> Result<Value> {
        match action {
            AnnouncementAction::List => {
                self.fetch_lenient(ApiRequest::get("/banners/search").root_scoped())
                    .await
            }
            AnnouncementAction::Create(announcement) => {
                require("message", &announcement.message)?;
                let body = self
                    .fetch_lenient(ApiRequest::post("/banners").json(&announcement)?.root_scoped())
                    .await?;
                info!("Created announcement");
                Ok(body)
            }
            AnnouncementAction::Update { id, announcement } => {
                require("id", &id)?;
                announcement.validate_for_update()?;
                let mut payload = serde_json::to_value(&announcement)?;
                if let Some(obj) = payload.as_object_mut() {
                    obj.insert("id".to_string(), Value::String(id.clone()));
                }
                let body = self
                    .fetch_lenient(
                        ApiRequest::put(format!("/banners/{}", id))
                            .json(&payload)?
                            .root_scoped(),
                    )
                    .await?;
                info!(id = %id, "Updated announcement");
                Ok(body)
            }
            AnnouncementAction::Delete { id } => {
                require("id", &id)?;
                let body = self
                    .fetch_lenient(ApiRequest::delete(format!("/banners/{}", id)).root_scoped())
                    .await?;
                info!(id = %id, "Deleted announcement");
                Ok(body)
            }
        }
    }
}
