//! End-to-end build: databases → datasets → entities → collections.
//!
//! A [`Pipeline`] is constructed once per build. It memoizes each raw
//! dataset, so a dataset shared by several collections (subscriptions, the
//! project list) is queried once. Failed queries are not memoized.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::OnceCell;
use tracing::{error, info, instrument};

use notionsite_client::{ContentStore, query_all};
use notionsite_discovery::{DataSourceResolver, DataSourceTarget};
use notionsite_shared::{
    Collections, Committee, Member, NotionSiteError, Page, Project, Result, SourcesConfig,
    WorkingGroup,
};

use crate::assets::{AssetFolder, AssetRequest, AssetStore};
use crate::enrichment::{for_each_page, page_content, save_asset};
use crate::mappers::{map_committee, map_member, map_project, map_working_group};
use crate::people::org_leads_by_company;
use crate::queries::Dataset;

/// Default number of pages enriched concurrently per collection.
pub const DEFAULT_CONCURRENCY: usize = 8;

// ---------------------------------------------------------------------------
// Collection kinds and progress
// ---------------------------------------------------------------------------

/// One of the four output collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Projects,
    Members,
    WorkingGroups,
    Committees,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Projects,
        CollectionKind::Members,
        CollectionKind::WorkingGroups,
        CollectionKind::Committees,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Projects => "projects",
            CollectionKind::Members => "members",
            CollectionKind::WorkingGroups => "working-groups",
            CollectionKind::Committees => "committees",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a collection starts building.
    fn collection_started(&self, kind: CollectionKind);
    /// Called when a collection finished with `count` entities.
    fn collection_finished(&self, kind: CollectionKind, count: usize);
    /// Called when a collection failed and will be empty.
    fn collection_failed(&self, kind: CollectionKind, error: &NotionSiteError);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn collection_started(&self, _kind: CollectionKind) {}
    fn collection_finished(&self, _kind: CollectionKind, _count: usize) {}
    fn collection_failed(&self, _kind: CollectionKind, _error: &NotionSiteError) {}
}

// ---------------------------------------------------------------------------
// Dataset memo
// ---------------------------------------------------------------------------

#[derive(Default)]
struct DatasetMemo {
    projects: OnceCell<Vec<Page>>,
    subscriptions: OnceCell<Vec<Page>>,
    members: OnceCell<Vec<Page>>,
    working_groups: OnceCell<Vec<Page>>,
    committees: OnceCell<Vec<Page>>,
}

impl DatasetMemo {
    fn cell(&self, dataset: Dataset) -> &OnceCell<Vec<Page>> {
        match dataset {
            Dataset::Projects => &self.projects,
            Dataset::Subscriptions => &self.subscriptions,
            Dataset::Members => &self.members,
            Dataset::WorkingGroups => &self.working_groups,
            Dataset::Committees => &self.committees,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Builds the four collections from the content store.
pub struct Pipeline {
    store: Arc<dyn ContentStore>,
    resolver: DataSourceResolver,
    assets: Arc<dyn AssetStore>,
    sources: SourcesConfig,
    concurrency: usize,
    memo: DatasetMemo,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ContentStore>,
        assets: Arc<dyn AssetStore>,
        sources: SourcesConfig,
    ) -> Self {
        Self {
            resolver: DataSourceResolver::new(store.clone()),
            store,
            assets,
            sources,
            concurrency: DEFAULT_CONCURRENCY,
            memo: DatasetMemo::default(),
        }
    }

    /// Bound the pages enriched at once within a collection.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolve the data source of every configured database.
    pub async fn resolve_sources(&self) -> Vec<(&'static str, Result<String>)> {
        let mut resolved = Vec::new();
        for (label, source) in self.sources.iter() {
            let target = DataSourceTarget::from((label, source));
            resolved.push((label, self.resolver.resolve(&target).await));
        }
        resolved
    }

    /// Pages of a dataset, queried on first use.
    async fn dataset(&self, dataset: Dataset) -> Result<&[Page]> {
        let pages = self
            .memo
            .cell(dataset)
            .get_or_try_init(|| self.fetch_dataset(dataset))
            .await?;
        Ok(pages)
    }

    #[instrument(skip(self), fields(dataset = dataset.name()))]
    async fn fetch_dataset(&self, dataset: Dataset) -> Result<Vec<Page>> {
        let target = DataSourceTarget::from(dataset.source(&self.sources));
        let data_source_id = self.resolver.resolve(&target).await?;
        let filter = dataset.filter();

        let response = query_all(self.store.as_ref(), &data_source_id, Some(&filter)).await?;
        info!(records = response.results.len(), "dataset fetched");
        Ok(response.results)
    }

    /// Render content and save the icon of one group or project page.
    async fn enrich(&self, page: &Page, folder: AssetFolder) -> String {
        let (content, _) = tokio::join!(
            page_content(self.store.as_ref(), &page.id),
            save_asset(self.assets.as_ref(), AssetRequest::icon(page, folder)),
        );
        content
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn build_projects(&self) -> Result<Vec<Project>> {
        let pages = self.dataset(Dataset::Projects).await?;
        let subscriptions = self.dataset(Dataset::Subscriptions).await?;

        let projects = for_each_page(pages, self.concurrency, |page| async move {
            let content = self.enrich(page, AssetFolder::Projects).await;
            map_project(page, subscriptions, content)
        })
        .await;

        info!(count = projects.len(), "projects built");
        Ok(projects)
    }

    #[instrument(skip_all)]
    pub async fn build_members(&self) -> Result<Vec<Member>> {
        let pages = self.dataset(Dataset::Members).await?;
        let subscriptions = self.dataset(Dataset::Subscriptions).await?;
        let org_leads = org_leads_by_company(subscriptions);
        let org_leads = &org_leads;

        let members = for_each_page(pages, self.concurrency, |page| async move {
            save_asset(self.assets.as_ref(), AssetRequest::logo(page)).await;
            map_member(page, org_leads)
        })
        .await;

        info!(count = members.len(), "members built");
        Ok(members)
    }

    #[instrument(skip_all)]
    pub async fn build_working_groups(&self) -> Result<Vec<WorkingGroup>> {
        let pages = self.dataset(Dataset::WorkingGroups).await?;
        let subscriptions = self.dataset(Dataset::Subscriptions).await?;
        let projects = self.dataset(Dataset::Projects).await?;

        let groups = for_each_page(pages, self.concurrency, |page| async move {
            let content = self.enrich(page, AssetFolder::WorkingGroups).await;
            map_working_group(page, subscriptions, projects, content)
        })
        .await;

        info!(count = groups.len(), "working groups built");
        Ok(groups)
    }

    #[instrument(skip_all)]
    pub async fn build_committees(&self) -> Result<Vec<Committee>> {
        let pages = self.dataset(Dataset::Committees).await?;
        let subscriptions = self.dataset(Dataset::Subscriptions).await?;
        let projects = self.dataset(Dataset::Projects).await?;

        let committees = for_each_page(pages, self.concurrency, |page| async move {
            let content = self.enrich(page, AssetFolder::Committees).await;
            map_committee(page, subscriptions, projects, content)
        })
        .await;

        info!(count = committees.len(), "committees built");
        Ok(committees)
    }

    /// Build the requested collections (all when `only` is empty).
    ///
    /// A collection that fails is logged and left empty; the others are
    /// unaffected.
    #[instrument(skip_all)]
    pub async fn build_all(
        &self,
        only: &[CollectionKind],
        progress: &dyn ProgressReporter,
    ) -> Collections {
        let start = Instant::now();

        let (projects, members, working_groups, committees) = tokio::join!(
            isolated(CollectionKind::Projects, only, progress, self.build_projects()),
            isolated(CollectionKind::Members, only, progress, self.build_members()),
            isolated(CollectionKind::WorkingGroups, only, progress, self.build_working_groups()),
            isolated(CollectionKind::Committees, only, progress, self.build_committees()),
        );

        info!(
            projects = projects.len(),
            members = members.len(),
            working_groups = working_groups.len(),
            committees = committees.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "build complete"
        );

        Collections {
            projects,
            members,
            working_groups,
            committees,
        }
    }
}

/// Await one collection, turning failure into an empty collection.
///
/// Collections missing from a non-empty `only` are skipped without
/// touching the store.
async fn isolated<T>(
    kind: CollectionKind,
    only: &[CollectionKind],
    progress: &dyn ProgressReporter,
    build: impl Future<Output = Result<Vec<T>>>,
) -> Vec<T> {
    if !only.is_empty() && !only.contains(&kind) {
        return Vec::new();
    }

    progress.collection_started(kind);
    match build.await {
        Ok(items) => {
            progress.collection_finished(kind, items.len());
            items
        }
        Err(e) => {
            error!(collection = %kind, error = %e, "collection failed; writing it empty");
            progress.collection_failed(kind, &e);
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::fixtures::{formula, select, subscription};
    use crate::people::{COMMITTEE_CHAIR, ORGANIZATION_LEAD, PROJECT_LEAD, WORKING_GROUP_CHAIR};
    use async_trait::async_trait;
    use notionsite_client::MemoryStore;
    use notionsite_shared::{
        Block, BlockKind, FileUrl, Icon, PropertyValue, RichTextSpan, SourceConfig,
    };
    use std::sync::Mutex;

    /// Records requests instead of downloading.
    #[derive(Default)]
    struct RecordingAssets {
        saved: Mutex<Vec<AssetRequest>>,
    }

    #[async_trait]
    impl AssetStore for RecordingAssets {
        async fn save(&self, request: &AssetRequest) -> Result<String> {
            self.saved.lock().unwrap().push(request.clone());
            request
                .public_path()
                .ok_or_else(|| NotionSiteError::Asset("no extension".into()))
        }
    }

    fn sources() -> SourcesConfig {
        let source = |db: &str| SourceConfig {
            database_id: db.into(),
            data_source_id: None,
        };
        SourcesConfig {
            projects: source("db-projects"),
            subscriptions: source("db-subs"),
            members: source("db-members"),
        }
    }

    fn titled(id: &str, title_prop: &str, title: &str) -> Page {
        Page::new(id).with_property(
            title_prop,
            PropertyValue::Title {
                title: vec![RichTextSpan::plain(title)],
            },
        )
    }

    fn project(id: &str, title: &str, kind: &str, parent: &str) -> Page {
        titled(id, "Name", title)
            .with_property("Internal Status", select("Active"))
            .with_property("Offer Subscription", select("Yes"))
            .with_property("Type", select(kind))
            .with_property("Parent", select(parent))
    }

    fn group(id: &str, title: &str, kind: &str) -> Page {
        titled(id, "Name", title)
            .with_property("Internal Status", select("Active"))
            .with_property("Type", select(kind))
            .with_icon(Icon::File {
                file: FileUrl {
                    url: format!("https://files/{id}.png?sig=1"),
                },
            })
    }

    fn active_subscription(page: Page) -> Page {
        page.with_property("Subscription Status", select("Active"))
    }

    fn member(id: &str, name: &str) -> Page {
        titled(id, "Member Name ", name).with_property("Status", select("Active"))
    }

    fn paragraph(id: &str, text: &str) -> Block {
        Block::new(id, BlockKind::paragraph(vec![RichTextSpan::plain(text)]))
    }

    /// A store holding one of everything, with all three databases resolvable.
    fn populated_store() -> MemoryStore {
        MemoryStore::new()
            .with_page_size(2)
            .with_database("db-projects", &[("ds-projects", "Projects")])
            .with_database("db-subs", &[("ds-subs", "Subscriptions")])
            .with_database("db-members", &[("ds-members", "Members")])
            .with_pages(
                "ds-projects",
                &[
                    project("p1", "Alpha", "WG Project", "Data WG"),
                    project("p2", "Beta", "Committee Project", "Security"),
                    project("p3", "Hidden", "Internal", "Data WG"),
                    group("wg1", "Data WG", "Working Group"),
                    group("c1", "Security", "Committee"),
                ],
            )
            .with_pages(
                "ds-subs",
                &[
                    active_subscription(subscription("s1", PROJECT_LEAD, &["p1"], ("Ada", "L"))),
                    active_subscription(subscription(
                        "s2",
                        WORKING_GROUP_CHAIR,
                        &["wg1"],
                        ("Grace", "H"),
                    )),
                    active_subscription(subscription("s3", COMMITTEE_CHAIR, &["c1"], ("Alan", "T"))),
                    active_subscription(
                        subscription("s4", ORGANIZATION_LEAD, &[], ("Wile", "C"))
                            .with_property("API-MN", formula("Acme")),
                    ),
                ],
            )
            .with_pages("ds-members", &[member("m1", "Acme"), member("m2", "Globex")])
            .with_children("p1", vec![paragraph("b1", "Alpha body")])
            .with_children("p2", vec![])
            .with_children("wg1", vec![paragraph("b2", "WG body")])
            .failing("c1")
    }

    fn pipeline(store: MemoryStore, assets: Arc<RecordingAssets>) -> (Arc<MemoryStore>, Pipeline) {
        let store = Arc::new(store);
        let pipeline = Pipeline::new(store.clone(), assets, sources()).with_concurrency(2);
        (store, pipeline)
    }

    #[tokio::test]
    async fn builds_every_collection() {
        let assets = Arc::new(RecordingAssets::default());
        let (store, pipeline) = pipeline(populated_store(), assets.clone());

        let collections = pipeline.build_all(&[], &SilentProgress).await;

        let project_ids: Vec<&str> = collections.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(project_ids, ["p1", "p2"]);
        assert_eq!(collections.projects[0].page_content, "<p>Alpha body</p>");
        assert_eq!(collections.projects[0].leads[0].name, "Ada L");

        assert_eq!(collections.working_groups.len(), 1);
        let wg = &collections.working_groups[0];
        assert_eq!(wg.page_content, "<p>WG body</p>");
        assert_eq!(wg.icon.as_deref(), Some("/assets/working-groups/wg1.png"));
        assert_eq!(wg.leads[0].name, "Grace H");
        assert_eq!(wg.projects.len(), 1);
        assert_eq!(wg.projects[0].id, "p1");

        // Content for c1 fails and is recovered as an empty body.
        let committee = &collections.committees[0];
        assert_eq!(committee.page_content, "");
        assert_eq!(committee.leads[0].name, "Alan T");
        assert_eq!(committee.projects[0].id, "p2");

        assert_eq!(collections.members.len(), 2);
        assert_eq!(collections.members[0].leads.as_ref().map(Vec::len), Some(1));
        assert_eq!(collections.members[1].leads, None);

        // Subscriptions feed all four collections but are queried once
        // (two pages of two records).
        assert_eq!(store.query_count("ds-subs"), 2);

        let saved = assets.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().any(|r| r.folder == AssetFolder::Committees));
    }

    #[tokio::test]
    async fn zero_data_sources_empties_only_that_collection() {
        let store = MemoryStore::new()
            .with_database("db-projects", &[("ds-projects", "Projects")])
            .with_database("db-subs", &[("ds-subs", "Subscriptions")])
            .with_database("db-members", &[])
            .with_pages("ds-projects", &[project("p1", "Alpha", "WG Project", "X")])
            .with_pages("ds-subs", &[])
            .with_children("p1", vec![]);
        let (_, pipeline) = pipeline(store, Arc::new(RecordingAssets::default()));

        let collections = pipeline.build_all(&[], &SilentProgress).await;

        assert!(collections.members.is_empty());
        assert_eq!(collections.projects.len(), 1);
        assert!(matches!(
            pipeline.build_members().await,
            Err(NotionSiteError::NoDataSources { .. })
        ));
    }

    #[tokio::test]
    async fn only_builds_requested_collections() {
        let (store, pipeline) = pipeline(populated_store(), Arc::new(RecordingAssets::default()));

        let collections = pipeline
            .build_all(&[CollectionKind::Members], &SilentProgress)
            .await;

        assert_eq!(collections.members.len(), 2);
        assert!(collections.projects.is_empty());
        assert_eq!(store.query_count("ds-projects"), 0);
    }

    #[tokio::test]
    async fn failed_queries_are_retried_next_time() {
        let store = MemoryStore::new()
            .with_database("db-projects", &[("ds-projects", "Projects")])
            .with_database("db-subs", &[("ds-subs", "Subscriptions")])
            .with_pages("ds-projects", &[])
            .failing("ds-subs");
        let (store, pipeline) = pipeline(store, Arc::new(RecordingAssets::default()));

        assert!(pipeline.build_projects().await.is_err());
        assert!(pipeline.build_projects().await.is_err());
        assert_eq!(store.query_count("ds-subs"), 2);
    }

    #[tokio::test]
    async fn rebuilding_is_byte_identical() {
        let first = pipeline(populated_store(), Arc::new(RecordingAssets::default())).1;
        let second = pipeline(populated_store(), Arc::new(RecordingAssets::default())).1;

        let a = serde_json::to_string(&first.build_all(&[], &SilentProgress).await).unwrap();
        let b = serde_json::to_string(&second.build_all(&[], &SilentProgress).await).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn resolves_every_source() {
        let store = MemoryStore::new()
            .with_database("db-projects", &[("ds-projects", "Projects")])
            .with_database("db-subs", &[("ds-subs", "Subscriptions")]);
        let (_, pipeline) = pipeline(store, Arc::new(RecordingAssets::default()));

        let resolved = pipeline.resolve_sources().await;
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].0, "projects");
        assert_eq!(resolved[0].1.as_deref().ok(), Some("ds-projects"));
        assert!(resolved[2].1.is_err());
    }
}
