use log::{info, warn};
use rotary_switch::{Position, Switch, SwitchCommand, SwitchConfig, SwitchKind};

use std::env;
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

fn parse_kind(s: &str) -> Option<SwitchKind> {
    match s {
        "handOffAuto" | "hand-off-auto" => Some(SwitchKind::HandOffAuto),
        "manualAuto" | "manual-auto" => Some(SwitchKind::ManualAuto),
        _ => None,
    }
}

fn parse_position(s: &str) -> Option<Position> {
    match s {
        "hand" => Some(Position::Hand),
        "off" => Some(Position::Off),
        "manual" => Some(Position::Manual),
        "auto" => Some(Position::Auto),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut builder_kind = SwitchKind::HandOffAuto;
    let mut title = "Rotary Switch".to_string();
    let mut width = 0usize;
    let mut height = 0usize;
    let mut marker_angle = 45.0;
    let mut font_path: Option<String> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--kind" => {
                if let Some(kind) = args.next().as_deref().and_then(parse_kind) {
                    builder_kind = kind;
                }
            }
            "--title" => {
                if let Some(t) = args.next() {
                    title = t;
                }
            }
            "--size" => {
                if let (Some(w), Some(h)) = (args.next(), args.next()) {
                    if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                        width = w;
                        height = h;
                    }
                }
            }
            "--marker-angle" => {
                if let Some(Ok(angle)) = args.next().map(|a| a.parse()) {
                    marker_angle = angle;
                }
            }
            "--font" => {
                font_path = args.next();
            }
            other => warn!("unknown argument {other}"),
        }
    }

    let font_data = match font_path {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };
    let config = SwitchConfig::builder()
        .kind(builder_kind)
        .title(title)
        .width(width)
        .height(height)
        .marker_angle(marker_angle)
        .maybe_font_data(font_data)
        .build();

    let mut switch = Switch::new(config)?;
    switch.on_click(|| info!("switch clicked"));

    // Feed position names from stdin: "hand", "off", "auto", "manual",
    // plus "redraw" and "destroy".
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let command = match line.trim() {
                "redraw" => Some(SwitchCommand::Redraw),
                "destroy" => Some(SwitchCommand::Destroy),
                word => parse_position(word).map(SwitchCommand::SetPosition),
            };
            match command {
                Some(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                None => warn!("unrecognized input {:?}", line.trim()),
            }
        }
    });

    switch.show_with_commands(receiver)?;
    Ok(())
}
