#![windows_subsystem = "windows"]

use std::time::Duration;

use dioxus::prelude::*;
use futures_util::future::join_all;

use panel_loader::{
    document::{Document as _, ImageStatus, MemoryDocument},
    driver,
    placeholder::class,
    view::MemoryDocumentView,
    LoaderOptions, LoaderType, PanelLoader,
};

static TITLE: &str = "Panel Loader";

/// JSON object merged on top of the default loader options
const OPTIONS_ENV: &str = "PANEL_LOADER_OPTIONS";

/// Spinner panels; `#archive` does not exist and is skipped with a warning
const SPINNER_PANELS: [&str; 3] = ["#gallery", "#notes", "#archive"];
const SKELETON_PANEL: &str = "#profile";

/// Simulated image completions: (selector, delay, outcome)
const IMAGE_EVENTS: [(&str, u64, ImageStatus); 5] = [
    ("#profile img", 300, ImageStatus::Loaded),
    ("#gallery img.first", 400, ImageStatus::Loaded),
    ("#gallery img.second", 900, ImageStatus::Loaded),
    ("#gallery img.broken", 1200, ImageStatus::Failed),
    ("#gallery img.last", 2600, ImageStatus::Loaded),
];

fn load_options() -> LoaderOptions {
    match std::env::var(OPTIONS_ENV) {
        Ok(json) => LoaderOptions::from_json_str(&json).unwrap_or_else(|e| {
            log::error!("{OPTIONS_ENV}: {e}, using defaults");
            LoaderOptions::default()
        }),
        Err(_) => LoaderOptions::default(),
    }
}

fn build_page(tree: &MemoryDocument) {
    let gallery = tree.element(tree.body(), "section");
    tree.set_id(gallery, "gallery");
    tree.add_class(&gallery, "panel");
    let title = tree.element(gallery, "h2");
    tree.text(title, "Gallery");
    for name in ["first", "second", "broken", "last"] {
        let img = tree.image(gallery, &format!("/pictures/{name}.png"), ImageStatus::Pending);
        tree.add_class(&img, name);
        tree.set_attribute(img, "alt", name);
    }

    let profile = tree.element(tree.body(), "section");
    tree.set_id(profile, "profile");
    tree.add_class(&profile, "panel");
    tree.image(profile, "/pictures/avatar.png", ImageStatus::Pending);
    let name = tree.element(profile, "p");
    tree.text(name, "Ada, explorer of forgotten libraries");

    let notes = tree.element(tree.body(), "aside");
    tree.set_id(notes, "notes");
    tree.add_class(&notes, "panel");
    let line = tree.element(notes, "p");
    tree.text(line, "No images here, the placeholder stays for the minimum duration.");
}

/// Puts every image of [`IMAGE_EVENTS`] back to pending, as freshly inserted
fn reset_images(tree: &MemoryDocument) {
    for (selector, _, _) in IMAGE_EVENTS {
        if let Some(img) = tree.query_selector(selector) {
            tree.set_image_status(img, ImageStatus::Pending);
            tree.remove_class(&img, class::LOADED);
        }
    }
}

/// Plays the delayed image completions of [`IMAGE_EVENTS`]
async fn simulate_images(tree: MemoryDocument) {
    let start = tokio::time::Instant::now();
    for (selector, delay, status) in IMAGE_EVENTS {
        tokio::time::sleep_until(start + Duration::from_millis(delay)).await;
        match tree.query_selector(selector) {
            Some(img) => tree.set_image_status(img, status),
            None => log::warn!("no image for {selector}"),
        }
    }
}

#[allow(non_snake_case)]
fn App() -> Element {
    log::debug!("App reload");

    let tree = use_hook(|| {
        let tree = MemoryDocument::new();
        build_page(&tree);
        tree
    });
    let mut revision = use_signal(|| tree.revision());

    let driven_tree = tree.clone();
    let loading = use_future(move || {
        let tree = driven_tree.clone();
        async move {
            let options = load_options();
            let mut loaders =
                PanelLoader::attach_to_multiple_panels(&tree, SPINNER_PANELS, options.clone());
            loaders.extend(PanelLoader::attach_to_panel(
                &tree,
                SKELETON_PANEL,
                options.with_loader_type(LoaderType::Skeleton),
            ));
            log::info!("{} panel(s) attached", loaders.len());

            reset_images(&tree);
            let start = driver::now();
            for loader in loaders.iter_mut() {
                loader.show_at(start);
            }
            revision.set(tree.revision());

            let drive = join_all(loaders.iter_mut().map(|loader| {
                driver::run_until_idle_with(loader, move |l| {
                    let mut revision = revision;
                    revision.set(l.document().revision());
                })
            }));
            futures_util::join!(simulate_images(tree.clone()), drive);
            log::info!("every panel revealed");
        }
    });

    use_drop(|| log::debug!("App Dropped"));

    rsx! {
        document::Title { "{TITLE}" }
        document::Stylesheet { href: asset!("/assets/panel-loader.css") }

        div { id: "app",
            header { class: "demo-header",
                h1 { "{TITLE}" }
                button {
                    disabled: !loading.finished(),
                    onclick: move |_| {
                        let mut loading = loading;
                        loading.restart();
                    },
                    "Replay"
                }
            }
            main { class: "demo-panels",
                MemoryDocumentView { tree: tree.clone(), revision: revision() }
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    log::info!("starting demo");

    #[cfg(feature = "desktop")]
    {
        use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
        LaunchBuilder::desktop()
            .with_cfg(
                Config::new().with_menu(None).with_window(
                    WindowBuilder::new()
                        .with_title(TITLE)
                        .with_inner_size(LogicalSize::new(1280, 800))
                        .with_resizable(true),
                ),
            )
            .launch(App)
    }
    #[cfg(not(feature = "desktop"))]
    dioxus::launch(App)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use panel_loader::{document::Document as _, LoaderState};

    #[test]
    fn test_replay_waits_for_images_again() {
        let tree = MemoryDocument::new();
        build_page(&tree);

        // state left behind by a first run
        for (selector, _, status) in IMAGE_EVENTS {
            let img = tree.query_selector(selector).unwrap();
            tree.set_image_status(img, status);
            tree.add_class(&img, class::LOADED);
        }

        reset_images(&tree);
        let mut loader =
            PanelLoader::attach_to_panel(&tree, "#gallery", LoaderOptions::default()).unwrap();
        let t0 = Instant::now();
        loader.show_at(t0);

        let last = tree.query_selector("#gallery img.last").unwrap();
        assert!(!tree.has_class(&last, class::LOADED));
        assert_eq!(
            loader.tick_at(t0 + Duration::from_millis(1500)),
            LoaderState::Showing
        );
        assert!(loader.waiting_on_images());

        for (selector, _, status) in IMAGE_EVENTS {
            let img = tree.query_selector(selector).unwrap();
            tree.set_image_status(img, status);
        }
        assert_eq!(
            loader.tick_at(t0 + Duration::from_millis(2600)),
            LoaderState::Revealing
        );
        assert!(tree.has_class(&last, class::LOADED));
    }
}
