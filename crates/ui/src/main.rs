use gpui::*;
use gpui_component::Root;

use nexus::app::{GoToChat, GoToDashboard, GoToSettings, GoToTasks, NexusShell, Quit};
use nexus::settings::apply_theme;
use nexus_core::SettingsStore;

/// Application entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. The tokio bridge used for provider calls
/// 3. gpui-component initialization (required for Root and themes)
/// 4. Global action handlers and view shortcuts
/// 5. The main window, themed from saved settings, wrapping the shell in Root
fn main() {
    // RUST_LOG controls verbosity; provider and settings events log through tracing.
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        // Completion and greeting requests run on this runtime.
        gpui_tokio_bridge::init(cx);

        // Must run before any Root is created.
        gpui_component::init(cx);

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        // cmd-1..4 follow the sidebar order.
        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-1", GoToDashboard, None),
            KeyBinding::new("cmd-2", GoToChat, None),
            KeyBinding::new("cmd-3", GoToTasks, None),
            KeyBinding::new("cmd-4", GoToSettings, None),
        ]);

        // Open the window once the app context has finished initializing.
        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1280.), px(820.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Nexus AI".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    // Theme first so the login screen never flashes the wrong mode.
                    let settings = SettingsStore::load().settings();
                    apply_theme(&settings, Some(&mut *window), cx);

                    let shell = cx.new(|cx| NexusShell::new(window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(error) => {
                        tracing::error!(error = %error, "failed to open main window");
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
