use anyhow::Result;

mod app;
mod auth;
mod chat;
mod config;
mod handler;
mod session;
mod tui;
mod ui;

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new(std::time::Duration::from_millis(300));
    let mut app = App::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }

        // Join any network task that finished while we were waiting; the
        // tick event guarantees this runs at least every 300ms.
        app.poll_tasks().await;
    }

    Ok(())
}
