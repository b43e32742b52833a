//! # Loader Module
//!
//! [`PanelLoader`] puts a placeholder over the content of one panel until the
//! images of that content settled and a minimum display time elapsed, then
//! fades the placeholder out and reveals the content.
//!
//! The loader never schedules anything by itself. Its timeline is an explicit
//! state machine ([`LoaderState`]) advanced by [`PanelLoader::tick`]; the host
//! calls it at the instant returned by [`PanelLoader::next_deadline`], or
//! periodically while images are still loading. The [`driver`](crate::driver)
//! module does exactly that with tokio timers.

mod preload;
mod state;

use std::time::Instant;

use uuid::Uuid;

use crate::{
    config::LoaderOptions,
    document::Document,
    error::{Error, Result},
    placeholder::{self, class},
};

pub use preload::{remaining_display_time, ImageGate};
pub use state::{LoaderState, REVEAL_DELAY};
use state::{Phase, Step};

/// Loading overlay controller bound to one panel element.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use panel_loader::prelude::*;
///
/// let doc = MemoryDocument::new();
/// let panel = doc.element(doc.body(), "section");
/// doc.set_id(panel, "gallery");
/// let img = doc.image(panel, "cat.png", ImageStatus::Pending);
///
/// let mut loader =
///     PanelLoader::attach_to_panel(&doc, "#gallery", LoaderOptions::default()).unwrap();
/// let t0 = Instant::now();
/// loader.show_at(t0);
/// assert!(loader.is_loading());
///
/// doc.set_image_status(img, ImageStatus::Loaded);
/// loader.tick_at(t0 + Duration::from_millis(100));
/// assert_eq!(loader.next_deadline(), Some(t0 + Duration::from_millis(1500)));
///
/// loader.tick_at(t0 + Duration::from_millis(1500));
/// assert_eq!(loader.state(), LoaderState::Revealing);
/// loader.tick_at(t0 + Duration::from_millis(2100));
/// assert!(!loader.is_loading());
/// ```
#[derive(Debug)]
pub struct PanelLoader<D: Document> {
    id: Uuid,
    document: D,
    panel: D::Node,
    options: LoaderOptions,
    content_wrapper: Option<D::Node>,
    loader_element: Option<D::Node>,
    phase: Phase<D::Node>,
}

impl<D: Document> PanelLoader<D> {
    pub fn new(document: D, panel: D::Node, options: LoaderOptions) -> Self {
        let id = Uuid::new_v4();
        log::debug!("PanelLoader {id} - created on {panel:?}");
        Self {
            id,
            document,
            panel,
            options,
            content_wrapper: None,
            loader_element: None,
            phase: Phase::Idle,
        }
    }

    /// Binds a new loader to the first element matching `selector`
    pub fn try_attach_to_panel(
        document: &D,
        selector: &str,
        options: LoaderOptions,
    ) -> Result<Self> {
        let panel = document
            .query_selector(selector)
            .ok_or_else(|| Error::PanelNotFound(selector.to_owned()))?;
        Ok(Self::new(document.clone(), panel, options))
    }

    /// Binds a new loader to the first element matching `selector`.
    ///
    /// Logs a warning and returns `None` when nothing matches.
    pub fn attach_to_panel(document: &D, selector: &str, options: LoaderOptions) -> Option<Self> {
        Self::try_attach_to_panel(document, selector, options)
            .map_err(|e| log::warn!("{e}"))
            .ok()
    }

    /// [`PanelLoader::attach_to_panel`] applied to every selector, keeping the
    /// loaders that could be created, in input order
    pub fn attach_to_multiple_panels<I, S>(
        document: &D,
        selectors: I,
        options: LoaderOptions,
    ) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        selectors
            .into_iter()
            .filter_map(|selector| {
                Self::attach_to_panel(document, selector.as_ref(), options.clone())
            })
            .collect()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn panel(&self) -> &D::Node {
        &self.panel
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Wrapper around the original panel content, once the first `show()` created it
    pub fn content_wrapper(&self) -> Option<&D::Node> {
        self.content_wrapper.as_ref()
    }

    /// Placeholder currently attached to the panel
    pub fn loader_element(&self) -> Option<&D::Node> {
        self.loader_element.as_ref()
    }

    pub fn state(&self) -> LoaderState {
        self.phase.state()
    }

    /// `true` from `show()` until the hide transition completed
    pub fn is_loading(&self) -> bool {
        self.state() != LoaderState::Idle
    }

    /// `true` while showing with images still unsettled
    pub fn waiting_on_images(&self) -> bool {
        matches!(self.phase, Phase::Showing { hide_at: None, .. })
    }

    /// Instant at which [`PanelLoader::tick_at`] has work to do, `None` when
    /// idle or while waiting on images
    pub fn next_deadline(&self) -> Option<Instant> {
        self.phase.next_deadline(self.options.fade_in_duration())
    }

    pub fn show(&mut self) {
        self.show_at(Instant::now())
    }

    /// Displays the placeholder over the panel content, as if called at `now`.
    ///
    /// No-op while already loading.
    pub fn show_at(&mut self, now: Instant) {
        if self.is_loading() {
            log::debug!("PanelLoader {} - show ignored: already loading", self.id);
            return;
        }
        log::debug!("PanelLoader {} - show", self.id);

        self.document.add_class(&self.panel, class::LOADING_STATE);

        let wrapper = self.ensure_content_wrapper();
        self.document.set_style(&wrapper, "opacity", "0");

        let placeholder = placeholder::build(
            &self.document,
            self.options.loader_type,
            &self.options.loading_text,
        );
        self.document.prepend_child(&self.panel, &placeholder);
        self.loader_element = Some(placeholder);

        let gate = ImageGate::track(&self.document, &wrapper, now);
        log::debug!(
            "PanelLoader {} - tracking {} pending image(s)",
            self.id,
            gate.pending()
        );
        self.phase = Phase::Showing {
            shown_at: now,
            gate,
            hide_at: None,
        };
        self.schedule_hide();
    }

    pub fn hide(&mut self) {
        self.hide_at(Instant::now())
    }

    /// Starts fading the placeholder out, as if called at `now`.
    ///
    /// No-op unless showing: hiding twice does not restart the fade.
    pub fn hide_at(&mut self, now: Instant) {
        if !matches!(self.phase, Phase::Showing { .. }) {
            log::debug!(
                "PanelLoader {} - hide ignored: state is {:?}",
                self.id,
                self.state()
            );
            return;
        }
        log::debug!("PanelLoader {} - hide", self.id);

        if let Some(placeholder) = &self.loader_element {
            self.document.set_style(placeholder, "opacity", "0");
            self.document.set_style(
                placeholder,
                "transition",
                &format!("opacity {}ms ease-in-out", self.options.fade_in_duration_ms),
            );
        }
        self.phase = Phase::Revealing {
            started_at: now,
            content_revealed: false,
        };
    }

    pub fn tick(&mut self) -> LoaderState {
        self.tick_at(Instant::now())
    }

    /// Applies every transition due at `now`, in deadline order, and returns
    /// the resulting state
    pub fn tick_at(&mut self, now: Instant) -> LoaderState {
        loop {
            let fade = self.options.fade_in_duration();
            let step = match &mut self.phase {
                Phase::Idle => None,
                Phase::Showing { hide_at, gate, .. } => {
                    if hide_at.is_none() && gate.poll(&self.document, now).is_some() {
                        self.schedule_hide();
                    }
                    self.next_deadline()
                        .filter(|at| *at <= now)
                        .map(Step::Hide)
                }
                Phase::Revealing {
                    started_at,
                    content_revealed,
                } => Phase::<D::Node>::revealing_step(*started_at, *content_revealed, fade, now),
            };
            match step {
                None => break,
                Some(Step::Hide(at)) => self.hide_at(at),
                Some(Step::Reveal) => self.reveal_content(),
                Some(Step::Finish) => self.finish(),
            }
        }
        self.state()
    }

    /// Notifies the loader that `img` fired its load or error event.
    ///
    /// Returns `false` when the image was not being waited on.
    pub fn image_settled(&mut self, img: &D::Node) -> bool {
        self.image_settled_at(img, Instant::now())
    }

    pub fn image_settled_at(&mut self, img: &D::Node, now: Instant) -> bool {
        let Phase::Showing { gate, .. } = &mut self.phase else {
            return false;
        };
        let tracked = gate.settle(&self.document, img, now);
        if tracked {
            self.schedule_hide();
        }
        tracked
    }

    /// Returns the wrapper of the panel content, creating it around the
    /// current children on first use
    fn ensure_content_wrapper(&mut self) -> D::Node {
        if let Some(wrapper) = &self.content_wrapper {
            return wrapper.clone();
        }
        let wrapper = match self
            .document
            .query_selector_within(&self.panel, &format!(".{}", class::CONTENT_WRAPPER))
        {
            Some(existing) => existing,
            None => {
                let wrapper = self.document.create_element("div");
                self.document.add_class(&wrapper, class::CONTENT_WRAPPER);
                for child in self.document.children(&self.panel) {
                    self.document.append_child(&wrapper, &child);
                }
                self.document.append_child(&self.panel, &wrapper);
                log::debug!("PanelLoader {} - content wrapper created", self.id);
                wrapper
            }
        };
        self.content_wrapper = Some(wrapper.clone());
        wrapper
    }

    /// Sets the automatic hide deadline once the image gate opened
    fn schedule_hide(&mut self) {
        let min = self.options.duration();
        if let Phase::Showing {
            shown_at,
            gate,
            hide_at,
        } = &mut self.phase
        {
            if hide_at.is_some() {
                return;
            }
            if let Some(opened_at) = gate.opened_at() {
                let at = opened_at + remaining_display_time(min, *shown_at, opened_at);
                log::debug!(
                    "PanelLoader {} - images settled, hiding in {:?}",
                    self.id,
                    at.saturating_duration_since(opened_at)
                );
                *hide_at = Some(at);
            }
        }
    }

    fn reveal_content(&mut self) {
        if let Some(wrapper) = &self.content_wrapper {
            self.document.add_class(wrapper, class::LOADED);
            self.document.set_style(wrapper, "opacity", "1");
        }
        if let Phase::Revealing {
            content_revealed, ..
        } = &mut self.phase
        {
            *content_revealed = true;
        }
    }

    fn finish(&mut self) {
        if let Phase::Revealing {
            content_revealed: false,
            ..
        } = self.phase
        {
            self.reveal_content();
        }
        if let Some(placeholder) = self.loader_element.take() {
            if self.document.parent(&placeholder).is_some() {
                self.document.remove(&placeholder);
            }
        }
        self.document.remove_class(&self.panel, class::LOADING_STATE);
        self.phase = Phase::Idle;
        log::debug!("PanelLoader {} - idle", self.id);
    }
}
