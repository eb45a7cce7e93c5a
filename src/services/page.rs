//! Page document store — canonical pages, lifecycle, and component edits.
//!
//! DESIGN
//! ======
//! The store owns the canonical copy of every page. Each page sits behind its
//! own `tokio::sync::Mutex`, so structural edits to one page run one at a time
//! while edits to different pages proceed in parallel. Reads clone the page
//! under its lock and therefore never observe a half-applied edit.
//!
//! Every mutation works on a draft clone: the draft is written through the
//! repository first and only then replaces the canonical copy. The editing
//! session's working copy (`current`) is refreshed from the canonical copy
//! after each committed edit and cleared when its page is archived.
//!
//! Slugs are unique among non-archived pages. The slug index has its own
//! mutex; lock order is page, then slug index, then current.
//!
//! ERROR HANDLING
//! ==============
//! Absent pages and component ids are `Ok(None)` / `Ok(false)`. Validation
//! failures and invalid transitions are rejected before anything is written.
//! Repository failures propagate unchanged; the store does not retry.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError};

use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::registry::ComponentResolver;
use crate::registry::schema::{ValidationError, validate_props};
use crate::services::condition::Condition;
use crate::services::persistence::{PageRepository, PersistenceError};
use crate::state::{ComponentAnimation, ComponentInstance, PageDocument, PageStatus, Props};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("slug already in use: {0}")]
    SlugTaken(String),
    #[error("invalid slug {0:?}: use lowercase letters, digits and '-'")]
    InvalidSlug(String),
    #[error("page {0} must not be blank")]
    MissingField(&'static str),
    #[error("cannot {action} a {from} page")]
    InvalidTransition { action: &'static str, from: PageStatus },
    #[error("page {0} is archived")]
    Archived(Uuid),
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),
    #[error("component id already on page: {0}")]
    DuplicateComponent(String),
    #[error("component position already taken: {0}")]
    PositionTaken(u32),
    #[error("invalid props for component {component_id}: {source}")]
    InvalidProps {
        component_id: String,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl crate::error::ErrorCode for PageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SlugTaken(_) | Self::Persistence(PersistenceError::UniqueViolation { .. }) => "E_SLUG_TAKEN",
            Self::InvalidSlug(_) | Self::MissingField(_) => "E_INVALID_PAGE",
            Self::InvalidTransition { .. } => "E_INVALID_TRANSITION",
            Self::Archived(_) => "E_PAGE_ARCHIVED",
            Self::UnknownComponentType(_) => "E_UNKNOWN_COMPONENT",
            Self::DuplicateComponent(_) | Self::PositionTaken(_) => "E_COMPONENT_CONFLICT",
            Self::InvalidProps { .. } => "E_VALIDATION",
            Self::Persistence(_) => "E_PERSISTENCE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Persistence(err) if err.retryable())
    }
}

/// Input for `create_page`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub name: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// Input for `add_component`. Missing props fall back to the definition's defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub style: Option<Props>,
    #[serde(default)]
    pub custom_class: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub animations: Vec<ComponentAnimation>,
}

/// Field-level patch for `update_component`. A present field replaces the
/// stored one wholesale; `props` is not merged key by key. An explicit `null`
/// for `style` or `customClass` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPatch {
    #[serde(default, rename = "type")]
    pub component_type: Option<String>,
    #[serde(default)]
    pub props: Option<Props>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    pub style: Option<Option<Props>>,
    #[serde(default, deserialize_with = "present")]
    pub custom_class: Option<Option<String>>,
    #[serde(default)]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default)]
    pub animations: Option<Vec<ComponentAnimation>>,
}

/// Marks a field that appeared in the body, `null` included. With
/// `#[serde(default)]` an absent field stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial page update for `save_page`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub template_id: Option<Option<String>>,
    #[serde(default)]
    pub components: Option<Vec<ComponentInstance>>,
}

/// Outcome of an edit closure: write the draft, or leave the page untouched.
enum Edit<T> {
    Commit(T),
    Skip(T),
}

type PageSlot = Arc<Mutex<PageDocument>>;

pub struct PageStore {
    repo: Arc<dyn PageRepository>,
    resolver: Arc<dyn ComponentResolver>,
    pages: RwLock<HashMap<Uuid, PageSlot>>,
    slugs: std::sync::Mutex<HashMap<String, Uuid>>,
    current: RwLock<Option<PageDocument>>,
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Lowercase ASCII letters, digits and `-`; not empty.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn require_text(value: &str, field: &'static str) -> Result<(), PageError> {
    if value.trim().is_empty() {
        return Err(PageError::MissingField(field));
    }
    Ok(())
}

fn ensure_editable(page: &PageDocument) -> Result<(), PageError> {
    if page.status == PageStatus::Archived {
        return Err(PageError::Archived(page.id));
    }
    Ok(())
}

/// One past the highest position; equals the length for a compacted page.
fn next_position(page: &PageDocument) -> u32 {
    page.components
        .iter()
        .map(|c| c.position + 1)
        .max()
        .unwrap_or(0)
}

fn reassign_positions(components: &mut [ComponentInstance]) {
    for (index, component) in components.iter_mut().enumerate() {
        component.position = u32::try_from(index).unwrap_or(u32::MAX);
    }
}

impl PageStore {
    #[must_use]
    pub fn new(repo: Arc<dyn PageRepository>, resolver: Arc<dyn ComponentResolver>) -> Self {
        Self {
            repo,
            resolver,
            pages: RwLock::new(HashMap::new()),
            slugs: std::sync::Mutex::new(HashMap::new()),
            current: RwLock::new(None),
        }
    }

    // =========================================================================
    // HYDRATION
    // =========================================================================

    /// Replace the canonical pages with everything in the repository.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the repository cannot be listed.
    pub async fn hydrate(&self) -> Result<usize, PageError> {
        let docs = self.repo.list().await?;
        let count = docs.len();

        let mut pages = self.pages.write().await;
        pages.clear();
        {
            let mut slugs = self.slugs.lock().unwrap_or_else(PoisonError::into_inner);
            slugs.clear();
            for doc in &docs {
                if doc.status == PageStatus::Archived {
                    continue;
                }
                if let Some(owner) = slugs.insert(doc.slug.clone(), doc.id) {
                    warn!(slug = %doc.slug, page_id = %doc.id, other = %owner, "duplicate active slug in storage");
                }
            }
        }
        for doc in docs {
            pages.insert(doc.id, Arc::new(Mutex::new(doc)));
        }
        drop(pages);
        *self.current.write().await = None;

        info!(count, "page store hydrated");
        Ok(count)
    }

    /// Seed the demo storefront pages into an empty repository.
    ///
    /// # Errors
    ///
    /// Returns the first store error hit while seeding.
    pub async fn seed_demo_pages(&self) -> Result<usize, PageError> {
        if !self.repo.list().await?.is_empty() {
            return Ok(0);
        }

        let demo = |name: &str, slug: &str, title: &str, description: &str, keywords: &str| NewPage {
            name: name.to_owned(),
            slug: slug.to_owned(),
            title: title.to_owned(),
            description: Some(description.to_owned()),
            keywords: Some(keywords.to_owned()),
            template_id: None,
            author_id: Some("1".to_owned()),
        };

        let home = self
            .create_page(demo("Home", "home", "My Shop - Home", "Welcome to my shop", "shop,shopping,products"))
            .await?;
        self.archive_page(home.id).await?;

        self.create_page(demo("Products", "products", "My Shop - Products", "Browse our products", "products,list,shopping"))
            .await?;

        let about = self
            .create_page(demo("About Us", "about", "My Shop - About Us", "Learn about our company", "about,company"))
            .await?;
        if self.resolver.resolve("banner").is_some() {
            let mut props = Props::new();
            props.insert("title".into(), serde_json::json!("About us"));
            props.insert("subtitle".into(), serde_json::json!("Quality goods since 2026"));
            let banner = NewComponent {
                id: Some("about-banner".into()),
                component_type: "banner".into(),
                props,
                position: None,
                style: None,
                custom_class: None,
                conditions: Vec::new(),
                animations: Vec::new(),
            };
            self.add_component(about.id, banner).await?;
        }
        self.publish_page(about.id).await?;

        info!("seeded demo pages");
        Ok(3)
    }

    // =========================================================================
    // READS
    // =========================================================================

    async fn slot(&self, id: Uuid) -> Option<PageSlot> {
        self.pages.read().await.get(&id).cloned()
    }

    pub async fn get_page(&self, id: Uuid) -> Option<PageDocument> {
        let slot = self.slot(id).await?;
        let page = slot.lock().await;
        Some(page.clone())
    }

    /// All pages, oldest first.
    pub async fn list_pages(&self) -> Vec<PageDocument> {
        let slots: Vec<PageSlot> = self.pages.read().await.values().cloned().collect();
        let mut all = Vec::with_capacity(slots.len());
        for slot in slots {
            all.push(slot.lock().await.clone());
        }
        all.sort_by_key(|p| (p.created_at, p.id));
        all
    }

    /// Pages that are not archived.
    pub async fn active_pages(&self) -> Vec<PageDocument> {
        let mut pages = self.list_pages().await;
        pages.retain(|p| p.status != PageStatus::Archived);
        pages
    }

    pub async fn published_pages(&self) -> Vec<PageDocument> {
        self.pages_with_status(PageStatus::Published).await
    }

    pub async fn draft_pages(&self) -> Vec<PageDocument> {
        self.pages_with_status(PageStatus::Draft).await
    }

    async fn pages_with_status(&self, status: PageStatus) -> Vec<PageDocument> {
        let mut pages = self.list_pages().await;
        pages.retain(|p| p.status == status);
        pages
    }

    /// The published page currently holding `slug`, if any.
    pub async fn find_published_by_slug(&self, slug: &str) -> Option<PageDocument> {
        let id = {
            let slugs = self.slugs.lock().unwrap_or_else(PoisonError::into_inner);
            slugs.get(slug).copied()
        }?;
        self.get_page(id)
            .await
            .filter(|p| p.status == PageStatus::Published && p.slug == slug)
    }

    /// The editing session's working copy.
    pub async fn current_page(&self) -> Option<PageDocument> {
        self.current.read().await.clone()
    }

    // =========================================================================
    // PAGE LIFECYCLE
    // =========================================================================

    /// Create a draft page.
    ///
    /// # Errors
    ///
    /// Rejects blank fields, malformed or taken slugs, and propagates
    /// repository failures.
    pub async fn create_page(&self, input: NewPage) -> Result<PageDocument, PageError> {
        require_text(&input.name, "name")?;
        require_text(&input.title, "title")?;
        if !is_valid_slug(&input.slug) {
            return Err(PageError::InvalidSlug(input.slug));
        }

        let id = Uuid::new_v4();
        self.reserve_slug(&input.slug, id)?;

        let created = now();
        let doc = PageDocument {
            id,
            name: input.name,
            slug: input.slug,
            title: input.title,
            description: input.description.unwrap_or_default(),
            keywords: input.keywords.unwrap_or_default(),
            components: Vec::new(),
            status: PageStatus::Draft,
            template_id: input.template_id,
            author_id: input.author_id,
            created_at: created,
            updated_at: created,
            published_at: None,
        };

        if let Err(err) = self.repo.create(&doc).await {
            error!(page_id = %id, error = %err, "failed to persist new page");
            self.release_slug(&doc.slug, id);
            return Err(err.into());
        }

        self.pages
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(doc.clone())));
        info!(page_id = %id, slug = %doc.slug, "page created");
        Ok(doc)
    }

    /// Open a page in the editing session and return it. An archived page is
    /// returned but does not become the working copy.
    ///
    /// # Errors
    ///
    /// Propagates repository failures when the page is not yet known locally.
    pub async fn load_page(&self, id: Uuid) -> Result<Option<PageDocument>, PageError> {
        let slot = match self.slot(id).await {
            Some(slot) => slot,
            None => match self.repo.get(id).await? {
                Some(doc) => self.adopt(doc).await,
                None => return Ok(None),
            },
        };

        let page = slot.lock().await;
        let mut current = self.current.write().await;
        if page.status == PageStatus::Archived {
            if current.as_ref().is_some_and(|c| c.id == id) {
                *current = None;
            }
        } else {
            *current = Some(page.clone());
        }
        Ok(Some(page.clone()))
    }

    /// Take in a page another writer stored, unless it is already known.
    async fn adopt(&self, doc: PageDocument) -> PageSlot {
        let mut pages = self.pages.write().await;
        if let Some(existing) = pages.get(&doc.id) {
            return existing.clone();
        }
        if doc.status != PageStatus::Archived && self.reserve_slug(&doc.slug, doc.id).is_err() {
            warn!(page_id = %doc.id, slug = %doc.slug, "adopted page shares an active slug");
        }
        let id = doc.id;
        let slot = Arc::new(Mutex::new(doc));
        pages.insert(id, slot.clone());
        slot
    }

    /// Merge metadata and, optionally, a whole new component list into a page.
    ///
    /// # Errors
    ///
    /// Rejects edits to archived pages, blank fields, taken or malformed
    /// slugs, and invalid components; propagates repository failures.
    pub async fn save_page(&self, id: Uuid, patch: PagePatch) -> Result<Option<PageDocument>, PageError> {
        if let Some(components) = &patch.components {
            self.check_components(components)?;
        }

        let mut reserved: Option<String> = None;
        let mut replaced: Option<String> = None;
        let result = self
            .edit(id, |page| {
                ensure_editable(page)?;
                if let Some(name) = patch.name {
                    require_text(&name, "name")?;
                    page.name = name;
                }
                if let Some(title) = patch.title {
                    require_text(&title, "title")?;
                    page.title = title;
                }
                if let Some(description) = patch.description {
                    page.description = description;
                }
                if let Some(keywords) = patch.keywords {
                    page.keywords = keywords;
                }
                if let Some(template_id) = patch.template_id {
                    page.template_id = template_id;
                }
                if let Some(components) = patch.components {
                    page.components = components;
                }
                if let Some(slug) = patch.slug
                    && slug != page.slug
                {
                    if !is_valid_slug(&slug) {
                        return Err(PageError::InvalidSlug(slug));
                    }
                    self.reserve_slug(&slug, page.id)?;
                    reserved = Some(slug.clone());
                    replaced = Some(std::mem::replace(&mut page.slug, slug));
                }
                page.updated_at = now();
                Ok(Edit::Commit(page.clone()))
            })
            .await;

        match &result {
            Ok(_) => {
                if let Some(old) = replaced {
                    self.release_slug(&old, id);
                }
            }
            Err(_) => {
                if let Some(new) = reserved {
                    self.release_slug(&new, id);
                }
            }
        }
        result
    }

    /// Move a draft page to `published`. Publishing a published page is a
    /// no-op that keeps the first `published_at`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from `archived`; repository failures propagate.
    pub async fn publish_page(&self, id: Uuid) -> Result<Option<PageDocument>, PageError> {
        let result = self
            .edit(id, |page| match page.status {
                PageStatus::Draft => {
                    let at = now();
                    page.status = PageStatus::Published;
                    page.published_at = Some(at);
                    page.updated_at = at;
                    Ok(Edit::Commit(page.clone()))
                }
                PageStatus::Published => Ok(Edit::Skip(page.clone())),
                PageStatus::Archived => {
                    Err(PageError::InvalidTransition { action: "publish", from: PageStatus::Archived })
                }
            })
            .await?;
        if result.is_some() {
            info!(page_id = %id, "page published");
        }
        Ok(result)
    }

    /// Move a published page back to `draft`. `published_at` is kept.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the page is published.
    pub async fn unpublish_page(&self, id: Uuid) -> Result<Option<PageDocument>, PageError> {
        let result = self
            .edit(id, |page| {
                if page.status != PageStatus::Published {
                    return Err(PageError::InvalidTransition { action: "unpublish", from: page.status });
                }
                page.status = PageStatus::Draft;
                page.updated_at = now();
                Ok(Edit::Commit(page.clone()))
            })
            .await?;
        if result.is_some() {
            info!(page_id = %id, "page unpublished");
        }
        Ok(result)
    }

    /// Archive a page. Its slug becomes free and, if it is the working copy,
    /// the editing session is closed. Archiving twice is a no-op.
    ///
    /// # Errors
    ///
    /// Repository failures propagate.
    pub async fn archive_page(&self, id: Uuid) -> Result<Option<PageDocument>, PageError> {
        self.edit_then(
            id,
            |page| {
                if page.status == PageStatus::Archived {
                    return Ok(Edit::Skip(page.clone()));
                }
                page.status = PageStatus::Archived;
                page.updated_at = now();
                Ok(Edit::Commit(page.clone()))
            },
            |page, _| {
                self.release_slug(&page.slug, page.id);
                info!(page_id = %page.id, slug = %page.slug, "page archived");
            },
        )
        .await
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Append a component. The position defaults to the end of the page.
    ///
    /// # Errors
    ///
    /// Rejects unregistered types, duplicate ids or positions, invalid props,
    /// and archived pages; propagates repository failures.
    pub async fn add_component(&self, page_id: Uuid, input: NewComponent) -> Result<Option<ComponentInstance>, PageError> {
        let resolution = self
            .resolver
            .resolve(&input.component_type)
            .ok_or_else(|| PageError::UnknownComponentType(input.component_type.clone()))?;
        let definition = resolution.definition;

        self.edit(page_id, |page| {
            ensure_editable(page)?;

            let id = input
                .id
                .unwrap_or_else(|| format!("{}_{}", input.component_type, Uuid::new_v4().simple()));
            if page.component(&id).is_some() {
                return Err(PageError::DuplicateComponent(id));
            }
            let position = input.position.unwrap_or_else(|| next_position(page));
            if page.components.iter().any(|c| c.position == position) {
                return Err(PageError::PositionTaken(position));
            }

            let mut props = definition.default_props.clone();
            props.extend(input.props);
            validate_props(&definition, &props)
                .map_err(|source| PageError::InvalidProps { component_id: id.clone(), source })?;

            let at = now();
            let instance = ComponentInstance {
                id,
                component_type: input.component_type,
                props,
                position,
                style: input.style,
                custom_class: input.custom_class,
                conditions: input.conditions,
                animations: input.animations,
                created_at: at,
                updated_at: at,
            };
            page.components.push(instance.clone());
            page.updated_at = at;
            Ok(Edit::Commit(instance))
        })
        .await
    }

    /// Apply a field-level patch to one component. `Ok(None)` when either the
    /// page or the component is absent; nothing is created.
    ///
    /// # Errors
    ///
    /// Rejects unregistered types, taken positions, invalid props and
    /// archived pages; propagates repository failures.
    pub async fn update_component(
        &self,
        page_id: Uuid,
        component_id: &str,
        patch: ComponentPatch,
    ) -> Result<Option<ComponentInstance>, PageError> {
        let result = self
            .edit(page_id, |page| {
                ensure_editable(page)?;
                let Some(index) = page.components.iter().position(|c| c.id == component_id) else {
                    return Ok(Edit::Skip(None));
                };

                let mut instance = page.components[index].clone();
                let revalidate = patch.component_type.is_some() || patch.props.is_some();
                if let Some(component_type) = patch.component_type {
                    instance.component_type = component_type;
                }
                if let Some(props) = patch.props {
                    instance.props = props;
                }
                if let Some(position) = patch.position {
                    if page
                        .components
                        .iter()
                        .any(|c| c.id != component_id && c.position == position)
                    {
                        return Err(PageError::PositionTaken(position));
                    }
                    instance.position = position;
                }
                if let Some(style) = patch.style {
                    instance.style = style;
                }
                if let Some(custom_class) = patch.custom_class {
                    instance.custom_class = custom_class;
                }
                if let Some(conditions) = patch.conditions {
                    instance.conditions = conditions;
                }
                if let Some(animations) = patch.animations {
                    instance.animations = animations;
                }
                if revalidate {
                    self.check_component(&instance)?;
                }

                let at = now();
                instance.updated_at = at;
                page.components[index] = instance.clone();
                page.updated_at = at;
                Ok(Edit::Commit(Some(instance)))
            })
            .await?;
        Ok(result.flatten())
    }

    /// Remove a component by id. `Ok(false)` when the page or id is absent.
    ///
    /// # Errors
    ///
    /// Rejects archived pages; propagates repository failures.
    pub async fn remove_component(&self, page_id: Uuid, component_id: &str) -> Result<bool, PageError> {
        let removed = self
            .edit(page_id, |page| {
                ensure_editable(page)?;
                let Some(index) = page.components.iter().position(|c| c.id == component_id) else {
                    return Ok(Edit::Skip(false));
                };
                page.components.remove(index);
                page.updated_at = now();
                Ok(Edit::Commit(true))
            })
            .await?;
        Ok(removed.unwrap_or(false))
    }

    /// Rebuild the component list in exactly the order of `ids`.
    ///
    /// Lossy: components whose id is not listed are dropped from the page, and
    /// unknown ids are ignored. Callers must pass the complete id set, or use
    /// [`PageStore::move_components`] to keep omitted components.
    ///
    /// # Errors
    ///
    /// Rejects archived pages; propagates repository failures.
    pub async fn reorder_components(&self, page_id: Uuid, ids: &[String]) -> Result<bool, PageError> {
        self.arrange(page_id, ids, false).await
    }

    /// Move the listed components to the front in the given order. Omitted
    /// components follow in their existing relative order.
    ///
    /// # Errors
    ///
    /// Rejects archived pages; propagates repository failures.
    pub async fn move_components(&self, page_id: Uuid, ids: &[String]) -> Result<bool, PageError> {
        self.arrange(page_id, ids, true).await
    }

    async fn arrange(&self, page_id: Uuid, ids: &[String], keep_omitted: bool) -> Result<bool, PageError> {
        let found = self
            .edit(page_id, |page| {
                ensure_editable(page)?;
                let mut remaining = std::mem::take(&mut page.components);
                let mut ordered = Vec::with_capacity(remaining.len());
                for id in ids {
                    if let Some(index) = remaining.iter().position(|c| &c.id == id) {
                        ordered.push(remaining.remove(index));
                    }
                }
                if keep_omitted {
                    ordered.append(&mut remaining);
                } else if !remaining.is_empty() {
                    let dropped: Vec<&str> = remaining.iter().map(|c| c.id.as_str()).collect();
                    warn!(%page_id, ?dropped, "reorder dropped components missing from the id list");
                }
                reassign_positions(&mut ordered);
                page.components = ordered;
                page.updated_at = now();
                Ok(Edit::Commit(()))
            })
            .await?;
        Ok(found.is_some())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Run `apply` on a draft of the page under its lock, write the draft
    /// through, then commit it as the canonical copy. `Ok(None)` when the page
    /// is unknown.
    async fn edit<T>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut PageDocument) -> Result<Edit<T>, PageError>,
    ) -> Result<Option<T>, PageError> {
        self.edit_then(id, apply, |_, _| {}).await
    }

    /// `edit`, plus `committed` run on the new canonical copy while the page
    /// lock is still held. Skipped edits and failed writes never reach it.
    async fn edit_then<T>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut PageDocument) -> Result<Edit<T>, PageError>,
        committed: impl FnOnce(&PageDocument, &T),
    ) -> Result<Option<T>, PageError> {
        let Some(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let mut canonical = slot.lock().await;
        let mut draft = canonical.clone();

        let value = match apply(&mut draft)? {
            Edit::Skip(value) => return Ok(Some(value)),
            Edit::Commit(value) => value,
        };

        if let Err(err) = self.repo.update(id, &draft).await {
            error!(page_id = %id, error = %err, "failed to persist page edit");
            return Err(err.into());
        }
        *canonical = draft;
        committed(&canonical, &value);
        self.sync_current(&canonical).await;
        Ok(Some(value))
    }

    async fn sync_current(&self, page: &PageDocument) {
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|c| c.id == page.id) {
            *current = (page.status != PageStatus::Archived).then(|| page.clone());
        }
    }

    fn reserve_slug(&self, slug: &str, id: Uuid) -> Result<(), PageError> {
        let mut slugs = self.slugs.lock().unwrap_or_else(PoisonError::into_inner);
        match slugs.get(slug) {
            Some(owner) if *owner != id => Err(PageError::SlugTaken(slug.to_owned())),
            _ => {
                slugs.insert(slug.to_owned(), id);
                Ok(())
            }
        }
    }

    fn release_slug(&self, slug: &str, id: Uuid) {
        let mut slugs = self.slugs.lock().unwrap_or_else(PoisonError::into_inner);
        if slugs.get(slug) == Some(&id) {
            slugs.remove(slug);
        }
    }

    fn check_component(&self, instance: &ComponentInstance) -> Result<(), PageError> {
        let resolution = self
            .resolver
            .resolve(&instance.component_type)
            .ok_or_else(|| PageError::UnknownComponentType(instance.component_type.clone()))?;
        validate_props(&resolution.definition, &instance.props)
            .map_err(|source| PageError::InvalidProps { component_id: instance.id.clone(), source })
    }

    fn check_components(&self, components: &[ComponentInstance]) -> Result<(), PageError> {
        let mut ids = HashSet::new();
        let mut positions = HashSet::new();
        for instance in components {
            if !ids.insert(instance.id.as_str()) {
                return Err(PageError::DuplicateComponent(instance.id.clone()));
            }
            if !positions.insert(instance.position) {
                return Err(PageError::PositionTaken(instance.position));
            }
            self.check_component(instance)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
