/// Stardust terminal demo
///
/// Controls:
///   - 1-4: Dust view (front, rear, left, right)
///   - Arrow keys / SPACE / SLASH: Move the cube camera
///   - , / .: Roll
///   - s / x: Pitch
///   - [ / ]: Yaw
///   - h: Help, q/ESC: Quit
use anyhow::Result;
use clap::Parser;
use stardust_terminal::cli::Cli;
use stardust_terminal::TerminalApp;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut app = TerminalApp::new(cli.into())?;
    app.run()
}
