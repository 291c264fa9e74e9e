use rand::Rng;
use rotary_switch::{Position, Switch, SwitchCommand, SwitchConfig, SwitchKind};

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SwitchConfig::builder()
        .kind(SwitchKind::HandOffAuto)
        .width(120)
        .height(132)
        .title("Rotary Switch - cycle demo".to_string())
        .build();
    let mut switch = Switch::new(config)?;
    switch.on_click(|| println!("clicked"));

    // Flip to a random position every couple of seconds.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let positions = [Position::Hand, Position::Off, Position::Auto];
        let mut rng = rand::rng();
        loop {
            let position = positions[rng.random_range(0..positions.len())];
            if sender.send(SwitchCommand::SetPosition(position)).is_err() {
                break;
            }
            thread::sleep(Duration::from_secs(2));
        }
    });

    println!("Cycling hand/off/auto every 2s; hover for the tooltip, click to log.");
    switch.show_with_commands(receiver)?;
    Ok(())
}
