//! This file provides the scan controller, which keeps a live document's
//! annotations in step with the user's settings and with the page's own
//! mutations.
//!
//! The controller moves between three phases:
//!
//! * **Idle**: no observation, no annotations. The starting phase, and the
//!   phase a disabled configuration leaves it in.
//! * **Scanning**: a full walk (after new settings) or a targeted walk of a
//!   mutation batch is in progress.
//! * **Observing**: the walk is done and mutations are being recorded.
//!
//! New settings always tear everything down first, so nothing from an older
//! configuration survives a rebuild.

use std::time::{Duration, Instant};

use crate::common::compilation::CompilableTo;
use crate::common::host::canonical_hostname;
use crate::common::pattern::CompiledMatcher;
use crate::common::validation::Issue;
use crate::input::document::{Document, Mutation, NodeId};
use crate::output::annotation::{apply_hide, clear_all, is_notice, reveal, suppressed_count};
use crate::output::report::{FrameContext, MatchReport, Messenger};
use crate::scan::debounce::Debouncer;
use crate::scan::selector::select_content_unit;
use crate::settings::options::ScanOptions;
use crate::settings::settings::{Settings, SettingsSource};

/// Elements whose text is never shown to the user as content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Observing,
}

/// Everything derived from one settings snapshot. Replaced wholesale on
/// every rebuild, never patched.
#[derive(Clone, Debug)]
pub struct ScanState {
    pub matcher: CompiledMatcher,
    pub enabled: bool,
    pub hide_completely: bool,
    pub disable_site: bool,
    pub put_inside: bool,
    /// Canonical hostname, when it could be determined.
    pub host: Option<String>,
}

impl ScanState {
    pub fn empty() -> ScanState {
        ScanState {
            matcher: CompiledMatcher::never(),
            enabled: false,
            hide_completely: false,
            disable_site: false,
            put_inside: false,
            host: None,
        }
    }

    /// Whether this state calls for scanning at all.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.disable_site
    }
}

pub struct ScanController<D: Document> {
    document: D,
    raw_host: String,
    frame: FrameContext,
    messenger: Box<dyn Messenger>,
    options: ScanOptions,
    state: ScanState,
    phase: ScanPhase,
    debouncer: Debouncer<Vec<Mutation>>,
}

impl<D: Document> ScanController<D> {
    /// Creates an idle controller. Nothing is scanned until settings arrive
    /// through `apply_settings` or `refresh`.
    ///
    /// # Arguments
    /// * `raw_host`: the page's host as reported by the browser
    /// * `frame`: where this instance runs, which decides whether it reports
    pub fn new(
        document: D,
        raw_host: &str,
        frame: FrameContext,
        messenger: Box<dyn Messenger>,
        options: ScanOptions,
    ) -> ScanController<D> {
        let debounce = options.debounce();
        ScanController {
            document: document,
            raw_host: String::from(raw_host),
            frame: frame,
            messenger: messenger,
            options: options,
            state: ScanState::empty(),
            phase: ScanPhase::Idle,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn debounce(&self) -> Duration {
        self.options.debounce()
    }

    /// Fetches settings from `source` and rebuilds with them.
    pub fn refresh(&mut self, source: &dyn SettingsSource) {
        let fetched = source.fetch();
        self.apply_settings(fetched);
    }

    /// Tears down all previous state and rebuilds from `fetched`.
    ///
    /// A failed retrieval is treated as a disabled configuration. When
    /// several retrievals are in flight, whichever completes last decides
    /// the final state, since every completion runs a full rebuild.
    pub fn apply_settings(&mut self, fetched: Result<Settings, Issue>) {
        self.teardown();

        let settings = match fetched {
            Ok(settings) => settings,
            Err(issue) => {
                warn!("unable to retrieve settings, staying disabled: {}", issue);
                Settings::disabled()
            }
        };
        let host = match canonical_hostname(&self.raw_host) {
            Ok(host) => Some(host),
            Err(issue) => {
                warn!("ignoring per-host settings for `{}`: {}", self.raw_host, issue);
                None
            }
        };
        let matcher = match settings.phrases().compile() {
            Ok(matcher) => matcher,
            Err(issue) => {
                warn!("unable to compile the blacklist, matching nothing: {}", issue);
                CompiledMatcher::never()
            }
        };

        let host_ref = host.as_ref().map(String::as_str);
        self.state = ScanState {
            matcher: matcher,
            enabled: settings.enabled,
            hide_completely: settings.hides_completely_on(host_ref),
            disable_site: settings.is_disabled_on(host_ref),
            put_inside: self.options.puts_inside(host_ref),
            host: host.clone(),
        };

        if self.state.is_active() {
            self.phase = ScanPhase::Scanning;
            let root = self.document.root();
            let hidden = self.scan_subtree(root);
            info!(
                "hid {} element(s) across {} phrase(s) on {:?}",
                hidden,
                settings.blacklist.len(),
                self.state.host
            );
            self.document.observe();
            self.phase = ScanPhase::Observing;
        } else {
            info!(
                "filtering is off on {:?} (enabled: {}, disabled for site: {})",
                self.state.host, self.state.enabled, self.state.disable_site
            );
        }

        self.report();
    }

    /// Stops observation, drops any pending batch and removes every
    /// annotation.
    fn teardown(&mut self) {
        self.document.disconnect();
        self.debouncer.cancel();
        clear_all(&mut self.document);
        self.state = ScanState::empty();
        self.phase = ScanPhase::Idle;
    }

    fn report(&mut self) {
        if !self.frame.may_report() {
            return;
        }
        let count = suppressed_count(&self.document);
        self.messenger.send(MatchReport { count: count });
    }

    /// Accepts a batch of mutation records. The batch waits for the
    /// debounce delay; a newer batch replaces it and restarts the wait.
    pub fn on_mutations(&mut self, records: Vec<Mutation>, now: Instant) {
        if self.phase != ScanPhase::Observing {
            debug!("ignoring {} mutation(s) while {:?}", records.len(), self.phase);
            return;
        }
        if records.is_empty() {
            return;
        }
        self.debouncer.schedule(records, now);
    }

    /// Takes whatever the document recorded since the last call and hands
    /// it to `on_mutations`.
    pub fn collect_mutations(&mut self, now: Instant) {
        if !self.document.is_observed() {
            return;
        }
        let records = self.document.take_records();
        self.on_mutations(records, now);
    }

    /// When the pending batch is due, if there is one.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Processes the pending batch if its delay has elapsed. Returns whether
    /// a batch was processed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.phase != ScanPhase::Observing {
            return false;
        }
        let records = match self.debouncer.poll(now) {
            Some(records) => records,
            None => return false,
        };
        self.phase = ScanPhase::Scanning;
        let hidden = self.scan_batch(&records);
        debug!("processed {} mutation(s), hid {} element(s)", records.len(), hidden);
        // Whatever was recorded meanwhile is our own annotation work.
        let own = self.document.take_records();
        if !own.is_empty() {
            debug!("discarded {} self-inflicted mutation(s)", own.len());
        }
        self.phase = ScanPhase::Observing;
        true
    }

    /// Routes a user activation of a notice to the annotation layer.
    pub fn activate_affordance(&mut self, node: NodeId) -> Result<NodeId, Issue> {
        let revealed = reveal(&mut self.document, node)?;
        info!("node {} revealed by the user", revealed.0);
        Ok(revealed)
    }

    fn scan_batch(&mut self, records: &[Mutation]) -> usize {
        let mut hidden = 0;
        for record in records {
            match record {
                Mutation::Attributes { target } => hidden += self.scan_subtree(*target),
                Mutation::ChildList { added, .. } => {
                    for node in added {
                        hidden += self.scan_subtree(*node);
                    }
                }
                Mutation::CharacterData { target } => {
                    if self.document.is_attached(*target) && !self.in_ignored_region(*target) {
                        if self.scan_text(*target) {
                            hidden += 1;
                        }
                    }
                }
            }
        }
        hidden
    }

    /// Runs every text node under `node` (inclusive) through the pipeline.
    /// Returns how many led to an annotation.
    fn scan_subtree(&mut self, node: NodeId) -> usize {
        if !self.document.is_attached(node) || self.in_ignored_region(node) {
            return 0;
        }
        let mut texts = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.document.text(current).is_some() {
                texts.push(current);
                continue;
            }
            if self.is_ignored(current) {
                continue;
            }
            for child in self.document.children(current).into_iter().rev() {
                stack.push(child);
            }
        }

        let mut hidden = 0;
        for text in texts {
            if self.scan_text(text) {
                hidden += 1;
            }
        }
        hidden
    }

    /// The per-node pipeline: test, select, annotate. Failures are logged
    /// and confined to this node.
    fn scan_text(&mut self, node: NodeId) -> bool {
        let text = match self.document.text(node) {
            Some(text) => text,
            None => return false,
        };
        if !self.state.matcher.test(&text) {
            return false;
        }
        let target = select_content_unit(&mut self.document, node);
        match apply_hide(
            &mut self.document,
            target,
            self.state.hide_completely,
            self.state.put_inside,
        ) {
            Ok(()) => {
                debug!("text node {} matched; annotated node {}", node.0, target.0);
                true
            }
            Err(issue) => {
                warn!("skipping text node {}: {}", node.0, issue);
                false
            }
        }
    }

    fn is_ignored(&self, node: NodeId) -> bool {
        if is_notice(&self.document, node) {
            return true;
        }
        match self.document.tag_name(node) {
            Some(tag) => SKIPPED_TAGS.contains(&tag.as_str()),
            None => false,
        }
    }

    fn in_ignored_region(&self, node: NodeId) -> bool {
        self.document
            .ancestry(node)
            .into_iter()
            .any(|ancestor| self.is_ignored(ancestor))
    }
}
