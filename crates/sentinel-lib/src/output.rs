use std::fmt::Write;

use crate::resilience::ResilienceReport;
use crate::risk::ChokepointInfo;
use crate::routing::ReroutingReport;
use crate::scoring::ScoredRoute;

/// Presentation style for textual output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    PlainText,
    /// Markdown suitable for chat tools and issue trackers.
    RichText,
}

/// Types that can be rendered for humans.
pub trait Render {
    fn render(&self, mode: RenderMode) -> String;
}

impl Render for ScoredRoute {
    fn render(&self, mode: RenderMode) -> String {
        let mut buffer = String::new();
        match mode {
            RenderMode::PlainText => {
                let _ = writeln!(buffer, "{}", self.path_label());
                let _ = writeln!(buffer, "  {}", route_stats(self));
                let chokepoints = self.chokepoints();
                if !chokepoints.is_empty() {
                    let _ = writeln!(buffer, "  chokepoints: {}", chokepoints.join(", "));
                }
            }
            RenderMode::RichText => {
                let ids = self
                    .port_ids()
                    .iter()
                    .map(|id| format!("`{id}`"))
                    .collect::<Vec<_>>()
                    .join(" → ");
                let _ = writeln!(buffer, "**{}** ({ids})", self.path_label());
                let _ = writeln!(buffer, "* {}", route_stats(self));
                for chokepoint in self.chokepoints() {
                    let _ = writeln!(buffer, "* transits `{chokepoint}`");
                }
            }
        }
        buffer
    }
}

/// Ranked list of routes returned by a single search.
#[derive(Debug, Clone, Copy)]
pub struct RouteList<'a>(pub &'a [ScoredRoute]);

impl Render for RouteList<'_> {
    fn render(&self, mode: RenderMode) -> String {
        if self.0.is_empty() {
            return "No route satisfies the constraints.\n".to_string();
        }
        let mut buffer = String::new();
        for (rank, route) in self.0.iter().enumerate() {
            match mode {
                RenderMode::PlainText => {
                    let _ = write!(buffer, "{:>2}. ", rank + 1);
                }
                RenderMode::RichText => {
                    let _ = write!(buffer, "{}. ", rank + 1);
                }
            }
            buffer.push_str(&route.render(mode));
        }
        buffer
    }
}

impl Render for ReroutingReport {
    fn render(&self, mode: RenderMode) -> String {
        let mut buffer = String::new();
        let heading = format!(
            "Rerouting {} -> {}",
            self.from.canonical_id, self.to.canonical_id
        );
        match mode {
            RenderMode::PlainText => {
                let _ = writeln!(buffer, "{heading}");
            }
            RenderMode::RichText => {
                let _ = writeln!(buffer, "### {heading}");
            }
        }

        match &self.original {
            Some(original) => {
                let _ = writeln!(buffer, "\nCurrent route:");
                buffer.push_str(&original.render(mode));
            }
            None => {
                let _ = writeln!(buffer, "\nCurrent route: none found");
            }
        }

        if !self.alternatives.is_empty() {
            let _ = writeln!(buffer, "\nAlternatives:");
        }
        for (rank, alternative) in self.alternatives.iter().enumerate() {
            let _ = writeln!(
                buffer,
                "{:>2}. [{}] score {:.1}",
                rank + 1,
                alternative.strategy,
                alternative.recommendation_score
            );
            buffer.push_str(&alternative.route.render(mode));
        }

        let _ = writeln!(buffer, "\n{}", self.recommendation);
        buffer
    }
}

impl Render for ResilienceReport {
    fn render(&self, mode: RenderMode) -> String {
        let mut buffer = String::new();
        let bullet = match mode {
            RenderMode::PlainText => "  -",
            RenderMode::RichText => "*",
        };
        let _ = writeln!(
            buffer,
            "Resilience {:.0}/100, redundancy {:.0}/100",
            self.overall_resilience, self.redundancy_score
        );
        if self.vulnerabilities.is_empty() {
            let _ = writeln!(buffer, "No vulnerabilities found.");
        } else {
            let _ = writeln!(buffer, "Vulnerabilities:");
            for vulnerability in &self.vulnerabilities {
                let _ = writeln!(
                    buffer,
                    "{bullet} [{}] {}",
                    vulnerability.severity, vulnerability.description
                );
            }
        }
        let _ = writeln!(buffer, "Recommendations:");
        for recommendation in &self.recommendations {
            let _ = writeln!(buffer, "{bullet} {recommendation}");
        }
        buffer
    }
}

/// Chokepoint risk snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ChokepointTable<'a>(pub &'a [ChokepointInfo]);

impl Render for ChokepointTable<'_> {
    fn render(&self, mode: RenderMode) -> String {
        let mut buffer = String::new();
        match mode {
            RenderMode::PlainText => {
                for info in self.0 {
                    let _ = writeln!(
                        buffer,
                        "{:<24} {:>5.2}  {}",
                        info.name, info.risk, info.level
                    );
                }
            }
            RenderMode::RichText => {
                let _ = writeln!(buffer, "| Chokepoint | Risk | Level |");
                let _ = writeln!(buffer, "|---|---|---|");
                for info in self.0 {
                    let _ = writeln!(
                        buffer,
                        "| {} | {:.2} | {} |",
                        info.name, info.risk, info.level
                    );
                }
            }
        }
        buffer
    }
}

fn route_stats(route: &ScoredRoute) -> String {
    format!(
        "{} hops, {:.0} km, {:.0} h, cost {:.0}, risk {:.2} ({})",
        route.hop_count(),
        route.total_distance_km,
        route.estimated_time_hours,
        route.estimated_cost,
        route.risk_score,
        route.risk_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn chokepoint_table_renders_rows() {
        let rows = [ChokepointInfo {
            id: "suez_canal".to_string(),
            name: "Suez Canal".to_string(),
            risk: 0.6,
            level: RiskLevel::High,
        }];
        let plain = ChokepointTable(&rows).render(RenderMode::PlainText);
        assert!(plain.contains("Suez Canal"));
        assert!(plain.contains("0.60"));
        assert!(plain.contains("high"));

        let rich = ChokepointTable(&rows).render(RenderMode::RichText);
        assert!(rich.starts_with("| Chokepoint |"));
    }

    #[test]
    fn empty_route_list_says_so() {
        let text = RouteList(&[]).render(RenderMode::PlainText);
        assert_eq!(text, "No route satisfies the constraints.\n");
    }
}
