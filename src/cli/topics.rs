//! Handler for the `topics` command.

use crate::adapter::outbound::jockmkt::JockmktClient;
use crate::cli::output;
use crate::domain::{League, RequiredArg};

/// Print every streaming topic with the argument it requires.
pub fn execute() {
    output::section("Streaming topics");
    for (topic, arg) in JockmktClient::ws_topics() {
        output::key_value(topic.as_str(), describe(arg));
    }
}

fn describe(arg: Option<RequiredArg>) -> String {
    match arg {
        None => "no argument".to_string(),
        Some(RequiredArg::EventId) => "event id, e.g. event:evt_123".to_string(),
        Some(RequiredArg::League) => {
            let leagues: Vec<&str> = League::ALL
                .into_iter()
                .filter(|league| league.has_game_feed())
                .map(League::as_str)
                .collect();
            format!("league ({})", leagues.join(", "))
        }
    }
}
