//! End-of-run summary.

use autohaul_control::NavMode;
use autohaul_perf::TaskExecutionStats;
use autohaul_types::{ActuatorCommand, FaultKind, TruckState};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: Scenario,
    pub elapsed_ms: u64,
    pub interrupted: bool,
    pub final_state: TruckState,
    pub final_output: ActuatorCommand,
    pub final_fault: FaultKind,
    pub nav_mode: NavMode,
    pub position: (f64, f64),
    pub heading_deg: f64,
    pub temperature_c: f64,
    pub waypoints_reached: usize,
    pub fault_transitions: u64,
    pub rearms: u32,
    pub watchdog_faults: u64,
    pub channel_overwrites: u64,
    pub dropped_fault_events: u64,
    pub tasks: BTreeMap<String, TaskExecutionStats>,
    #[serde(skip)]
    pub performance_table: String,
}

impl RunSummary {
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self),
            ReportFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        let interrupted = if self.interrupted { " (interrupted)" } else { "" };
        let arrived = if self.final_output.arrived { " (arrived)" } else { "" };
        let (x, y) = self.position;

        let mut out = String::new();
        out.push_str(&format!("Scenario:           {:?}\n", self.scenario));
        out.push_str(&format!("Elapsed:            {} ms{interrupted}\n", self.elapsed_ms));
        out.push_str(&format!("Final state:        {}\n", self.final_state));
        out.push_str(&format!(
            "Final output:       velocity {} steering {}{arrived}\n",
            self.final_output.velocity, self.final_output.steering
        ));
        out.push_str(&format!("Fault:              {}\n", self.final_fault));
        out.push_str(&format!("Navigation:         {}\n", self.nav_mode));
        out.push_str(&format!(
            "Position:           ({x:.1}, {y:.1}) heading {:.0} deg\n",
            self.heading_deg
        ));
        out.push_str(&format!("Temperature:        {:.1} C\n", self.temperature_c));
        out.push_str(&format!("Waypoints reached:  {}\n", self.waypoints_reached));
        out.push_str(&format!("Fault transitions:  {}\n", self.fault_transitions));
        out.push_str(&format!("Rearms:             {}\n", self.rearms));
        out.push_str(&format!("Watchdog faults:    {}\n", self.watchdog_faults));
        out.push_str(&format!("Channel overwrites: {}\n", self.channel_overwrites));
        out.push_str(&format!("Dropped events:     {}\n", self.dropped_fault_events));
        out.push('\n');
        out.push_str(&self.performance_table);
        out
    }
}
