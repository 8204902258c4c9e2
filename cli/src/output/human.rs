//! Human-readable terminal renderer.

use hoster_common::ServiceRecord;
use owo_colors::OwoColorize as _;

use crate::domain::{DeployConfig, RegionOutcome, RegionReport, RunReport, SyncMode};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if !self.ctx.quiet {
            println!("hoster {version}");
        }
    }

    /// Render the result of `validate`.
    pub fn render_config(&self, config: &DeployConfig) {
        self.ctx.success("config is valid");
        self.ctx.kv("domain   ", &config.domain_name);
        self.ctx.kv("projects ", &config.projects.len().to_string());
        let regions: Vec<&str> = config.regions.iter().map(|r| r.name.as_str()).collect();
        self.ctx.kv("regions  ", &regions.join(", "));
    }

    /// Render a finished run. Failures always reach stderr, even when quiet.
    pub fn render_run(&self, report: &RunReport, mode: SyncMode) {
        if !self.ctx.quiet {
            println!();
        }
        for region in &report.regions {
            self.render_region(region);
        }
        for name in &report.skipped {
            self.ctx.warn(&format!("{name}: skipped"));
        }

        let failed = report.failures().count();
        let elapsed = (report.finished_at - report.started_at).num_seconds();
        if failed == 0 && report.skipped.is_empty() {
            self.ctx.success(&format!(
                "{} finished for {} region(s) in {elapsed}s",
                mode.command(),
                report.regions.len()
            ));
        } else {
            self.ctx.error(&format!(
                "{} failed: {failed} region(s) failed, {} skipped",
                mode.command(),
                report.skipped.len()
            ));
        }
    }

    fn render_region(&self, report: &RegionReport) {
        let name = report.region.as_str();
        match &report.outcome {
            RegionOutcome::Failed { stage, error } => {
                self.ctx.error(&format!("{name}: failed during {stage}: {error}"));
            }
            RegionOutcome::Synced { built, destroyed } => {
                if built.is_empty() && destroyed.is_empty() {
                    self.ctx.success(&format!("{name}: up to date"));
                } else {
                    self.ctx.success(&format!(
                        "{name}: built [{}], removed [{}]",
                        built.join(", "),
                        destroyed.join(", ")
                    ));
                }
            }
            RegionOutcome::Planned { partition, drift } => {
                self.ctx.header(name);
                if partition.is_empty() {
                    self.ctx.info("no changes");
                }
                if self.ctx.quiet {
                    return;
                }
                let s = &self.ctx.styles;
                for rec in &partition.new {
                    println!("    {} {} ({})", "+".style(s.added), rec.subdomain, short(rec));
                }
                for rec in &partition.changed {
                    println!("    {} {} ({})", "~".style(s.warning), rec.subdomain, short(rec));
                }
                for sub in &partition.removed {
                    println!("    {} {sub}", "-".style(s.removed));
                }
                for sub in drift {
                    self.ctx.warn(&format!(
                        "{sub}: repository changed but commit did not; it will not be rebuilt"
                    ));
                }
            }
            RegionOutcome::Inspected { services } => {
                self.ctx.header(name);
                if services.is_empty() {
                    self.ctx.info("no services");
                }
                for rec in services {
                    self.ctx.kv(&rec.subdomain, &format!("{}  {}", short(rec), rec.repo_url));
                }
            }
        }
    }
}

fn short(rec: &ServiceRecord) -> &str {
    rec.last_commit.get(..7).unwrap_or(&rec.last_commit)
}
