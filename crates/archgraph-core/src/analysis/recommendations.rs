//! Refactoring recommendations from analysis findings.

use serde::{Deserialize, Serialize};

use super::cycles::{Cycle, Severity};
use super::GodObject;
use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    HighCoupling,
    LowCohesion,
    CyclicDependency,
    GodObject,
    OrphanModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Rough size of the suggested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: IssueCategory,
    pub priority: Priority,
    pub issue: String,
    pub action: String,
    pub effort: Effort,
}

/// Findings a recommendation can be derived from.
pub struct Findings<'a> {
    pub coupling: f64,
    pub cohesion: f64,
    pub cycles: &'a [Cycle],
    pub god_objects: &'a [GodObject],
    pub orphans: &'a [String],
}

/// One recommendation per issue category found, in category order.
pub fn recommend(findings: &Findings<'_>, config: &AnalysisConfig) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if findings.coupling > config.high_coupling {
        recommendations.push(Recommendation {
            category: IssueCategory::HighCoupling,
            priority: Priority::High,
            issue: format!(
                "Average module coupling is {:.2}, above the {:.2} threshold",
                findings.coupling, config.high_coupling
            ),
            action: "Put narrow interfaces between the most connected modules and move \
                     shared logic into dedicated common modules"
                .to_string(),
            effort: Effort::Medium,
        });
    }

    if findings.cohesion < config.low_cohesion {
        recommendations.push(Recommendation {
            category: IssueCategory::LowCohesion,
            priority: Priority::Medium,
            issue: format!(
                "Average module cohesion is {:.2}, below the {:.2} threshold",
                findings.cohesion, config.low_cohesion
            ),
            action: "Regroup routines so that each module's callables mostly call each other; \
                     split modules that serve unrelated callers"
                .to_string(),
            effort: Effort::Medium,
        });
    }

    if !findings.cycles.is_empty() {
        let worst = findings
            .cycles
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Low);
        let longest = findings.cycles.iter().map(|c| c.length).max().unwrap_or(0);
        let (priority, effort) = match worst {
            Severity::High => (Priority::High, Effort::Large),
            Severity::Medium => (Priority::High, Effort::Medium),
            Severity::Low => (Priority::Medium, Effort::Small),
        };

        recommendations.push(Recommendation {
            category: IssueCategory::CyclicDependency,
            priority,
            issue: format!(
                "{} dependency cycle(s) found, the longest spans {} components",
                findings.cycles.len(),
                longest
            ),
            action: "Break each cycle by inverting one dependency or extracting the shared \
                     part into a module both sides can depend on"
                .to_string(),
            effort,
        });
    }

    if !findings.god_objects.is_empty() {
        let names: Vec<&str> = findings
            .god_objects
            .iter()
            .take(3)
            .map(|g| g.display_name.as_str())
            .collect();

        recommendations.push(Recommendation {
            category: IssueCategory::GodObject,
            priority: Priority::High,
            issue: format!(
                "{} oversized module(s), largest: {}",
                findings.god_objects.len(),
                names.join(", ")
            ),
            action: "Split each oversized module along its responsibilities and route \
                     callers through the new, smaller modules"
                .to_string(),
            effort: Effort::Large,
        });
    }

    if !findings.orphans.is_empty() {
        recommendations.push(Recommendation {
            category: IssueCategory::OrphanModule,
            priority: Priority::Low,
            issue: format!("{} module(s) have no connections", findings.orphans.len()),
            action: "Confirm the modules are still used; remove dead ones or wire them into \
                     the subsystem they belong to"
                .to_string(),
            effort: Effort::Small,
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_findings_yield_nothing() {
        let findings = Findings {
            coupling: 0.1,
            cohesion: 0.9,
            cycles: &[],
            god_objects: &[],
            orphans: &[],
        };
        assert!(recommend(&findings, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_one_recommendation_per_category() {
        let cycles = vec![
            Cycle::new(vec!["a".into(), "b".into()]),
            Cycle::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        ];
        let orphans = vec!["module:lonely".to_string()];
        let findings = Findings {
            coupling: 0.8,
            cohesion: 0.2,
            cycles: &cycles,
            god_objects: &[],
            orphans: &orphans,
        };

        let recs = recommend(&findings, &AnalysisConfig::default());
        let categories: Vec<IssueCategory> = recs.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                IssueCategory::HighCoupling,
                IssueCategory::LowCohesion,
                IssueCategory::CyclicDependency,
                IssueCategory::OrphanModule,
            ]
        );
        assert_eq!(recs[2].effort, Effort::Large);
        assert!(recs[2].issue.contains("spans 4"));
    }
}
