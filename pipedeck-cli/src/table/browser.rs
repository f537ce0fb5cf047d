//! Pipeline list with per-row nested version tables

use std::collections::{BTreeMap, HashMap, HashSet};

use pipedeck_core::domain::pipeline::Pipeline;
use pipedeck_core::domain::pipeline::PipelineVersion;

use super::{ExpandState, ListSource, ListView};

type VersionViewFactory<V> = Box<dyn Fn(&str) -> ListView<V> + Send + Sync>;

/// A pipelines table whose rows expand into their versions
///
/// Each expanded pipeline owns an independent version view with its own
/// paging and selection. Collapsing a row keeps that view so re-expanding
/// restores its selection.
pub struct PipelineBrowser<P, V>
where
    P: ListSource<Row = Pipeline>,
    V: ListSource<Row = PipelineVersion>,
{
    pipelines: ListView<P>,
    versions: HashMap<String, ListView<V>>,
    make_versions: VersionViewFactory<V>,
}

impl<P, V> PipelineBrowser<P, V>
where
    P: ListSource<Row = Pipeline>,
    V: ListSource<Row = PipelineVersion>,
{
    pub fn new(
        pipelines: ListView<P>,
        make_versions: impl Fn(&str) -> ListView<V> + Send + Sync + 'static,
    ) -> Self {
        Self {
            pipelines,
            versions: HashMap::new(),
            make_versions: Box::new(make_versions),
        }
    }

    pub fn pipelines(&self) -> &ListView<P> {
        &self.pipelines
    }

    /// Version view of a pipeline, once it has been expanded
    pub fn versions(&self, pipeline_id: &str) -> Option<&ListView<V>> {
        self.versions.get(pipeline_id)
    }

    /// Expand or collapse a pipeline row
    ///
    /// Expanding loads the pipeline's versions. Returns the new state, or
    /// `None` when no displayed pipeline has that id.
    pub async fn toggle_expansion(&mut self, pipeline_id: &str) -> Option<ExpandState> {
        let state = self.pipelines.toggle_expansion(pipeline_id)?;
        if state == ExpandState::Expanded {
            let make = &self.make_versions;
            let view = self
                .versions
                .entry(pipeline_id.to_string())
                .or_insert_with(|| make(pipeline_id));
            view.reload().await;
        }
        Some(state)
    }

    /// Reload the pipelines table
    ///
    /// Version views of pipelines that left the displayed page are dropped
    /// along with their selection.
    pub async fn reload(&mut self) -> String {
        let token = self.pipelines.reload().await;
        let displayed = self.displayed_pipelines();
        self.versions.retain(|id, _| displayed.contains(id.as_str()));
        token
    }

    /// Selected version ids, keyed by pipeline id
    ///
    /// Only pipelines on the displayed page are reported.
    pub fn selected_versions(&self) -> BTreeMap<String, Vec<String>> {
        let displayed = self.displayed_pipelines();
        self.versions
            .iter()
            .filter(|(pipeline_id, _)| displayed.contains(pipeline_id.as_str()))
            .map(|(pipeline_id, view)| (pipeline_id.clone(), view.selected_ids()))
            .filter(|(_, ids)| !ids.is_empty())
            .collect()
    }

    fn displayed_pipelines(&self) -> HashSet<String> {
        self.pipelines.rows().iter().map(|p| p.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::testing::FakeSource;
    use crate::table::{ListPage, log_errors};

    fn pipeline(id: &str) -> Pipeline {
        Pipeline {
            id: id.to_string(),
            name: format!("pipeline {}", id),
            ..Default::default()
        }
    }

    fn version(pipeline_id: &str, i: usize) -> PipelineVersion {
        PipelineVersion {
            id: format!("{}-v{}", pipeline_id, i),
            name: format!("version {}", i),
            ..Default::default()
        }
    }

    async fn browser() -> PipelineBrowser<FakeSource<Pipeline>, FakeSource<PipelineVersion>> {
        let pipelines = ListView::new(
            FakeSource::new(vec![Ok(ListPage::new(
                vec![pipeline("p1"), pipeline("p2")],
                "",
            ))]),
            10,
            log_errors(),
        );
        pipelines.reload().await;

        PipelineBrowser::new(pipelines, |pipeline_id| {
            let rows = (0..2).map(|i| version(pipeline_id, i)).collect();
            ListView::new(
                FakeSource::new(vec![Ok(ListPage::new(rows, ""))]),
                10,
                log_errors(),
            )
        })
    }

    #[tokio::test]
    async fn test_expanding_loads_versions_of_that_pipeline_only() {
        let mut browser = browser().await;

        let state = browser.toggle_expansion("p1").await;

        assert_eq!(state, Some(ExpandState::Expanded));
        let versions = browser.versions("p1").unwrap();
        assert_eq!(versions.rows()[0].id, "p1-v0");
        assert!(browser.versions("p2").is_none());
        assert_eq!(
            browser.pipelines().expand_state("p2"),
            ExpandState::Collapsed
        );
    }

    #[tokio::test]
    async fn test_toggle_twice_collapses_and_keeps_selection() {
        let mut browser = browser().await;
        browser.pipelines().select("p2");
        browser.toggle_expansion("p1").await;
        browser.versions("p1").unwrap().select("p1-v1");

        assert_eq!(
            browser.toggle_expansion("p1").await,
            Some(ExpandState::Collapsed)
        );

        assert_eq!(browser.pipelines().selected_ids(), vec!["p2"]);
        let selected = browser.selected_versions();
        assert_eq!(selected.get("p1"), Some(&vec!["p1-v1".to_string()]));
        assert_eq!(browser.toggle_expansion("nope").await, None);
    }

    #[tokio::test]
    async fn test_reload_drops_versions_of_vanished_pipelines() {
        let pipelines = ListView::new(
            FakeSource::new(vec![
                Ok(ListPage::new(vec![pipeline("p1"), pipeline("p2")], "")),
                Ok(ListPage::new(vec![pipeline("p2")], "")),
            ]),
            10,
            log_errors(),
        );
        pipelines.reload().await;
        let mut browser = PipelineBrowser::new(pipelines, |pipeline_id| {
            let rows = (0..2).map(|i| version(pipeline_id, i)).collect();
            ListView::new(
                FakeSource::new(vec![Ok(ListPage::new(rows, ""))]),
                10,
                log_errors(),
            )
        });
        browser.toggle_expansion("p1").await;
        browser.toggle_expansion("p2").await;
        browser.versions("p1").unwrap().select("p1-v0");
        browser.versions("p2").unwrap().select("p2-v1");

        browser.reload().await;

        assert!(browser.versions("p1").is_none());
        let selected = browser.selected_versions();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.get("p2"), Some(&vec!["p2-v1".to_string()]));
    }

    #[tokio::test]
    async fn test_selection_of_undisplayed_pipeline_is_not_reported() {
        let pipelines = ListView::new(
            FakeSource::new(vec![
                Ok(ListPage::new(vec![pipeline("p1")], "")),
                Ok(ListPage::new(vec![pipeline("p3")], "")),
            ]),
            10,
            log_errors(),
        );
        pipelines.reload().await;
        let mut browser = PipelineBrowser::new(pipelines, |pipeline_id| {
            ListView::new(
                FakeSource::new(vec![Ok(ListPage::new(vec![version(pipeline_id, 0)], ""))]),
                10,
                log_errors(),
            )
        });
        browser.toggle_expansion("p1").await;
        browser.versions("p1").unwrap().select("p1-v0");

        // Reloading through the inner view bypasses the browser's pruning
        browser.pipelines().reload().await;

        assert!(browser.selected_versions().is_empty());
    }
}
