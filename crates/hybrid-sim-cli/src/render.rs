//! Plain-text rendering of records and optimizer reports.

use hybrid_sim_core::optimizer::{
    BaselineReport, GenerationMetrics, OptimizerStatus, OptimizerSummary, RankedIndividual,
};
use hybrid_sim_core::stats::{StatKey, StatValue};
use hybrid_sim_core::{IndividualRecord, Lineage, PhenotypeCatalog, Species};
use std::fmt::Write;

fn stat_line(out: &mut String, label: &str, key: StatKey, value: &StatValue) {
    let unit = match value {
        StatValue::Acuity { .. } | StatValue::Flag(_) | StatValue::Diet(_) => "",
        _ => key.unit(),
    };
    let _ = writeln!(out, "  {label:<22} {value}{unit}");
}

pub fn record(record: &IndividualRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", record.name, record.display_species());
    let _ = writeln!(out, "  genotype: {}", record.genotype);
    match &record.lineage {
        Lineage::Original => {}
        Lineage::SpeciesCross { parents } => {
            let _ = writeln!(out, "  cross of {} x {}", parents[0], parents[1]);
        }
        Lineage::Bred { parents } => {
            let _ = writeln!(out, "  bred from {} x {}", parents[0], parents[1]);
        }
    }
    for (key, value) in record.stats.iter() {
        stat_line(&mut out, key.label(), key, value);
    }
    for head in record.stats.heads() {
        for (key, value) in &head.values {
            stat_line(&mut out, &head.label(*key), *key, value);
        }
    }
    if !record.mutations.is_empty() {
        let _ = writeln!(out, "  mutations:");
        for note in record.mutations.values() {
            let _ = writeln!(out, "    {note}");
        }
    }
    out
}

/// Every known species in catalog order with its genotype count.
pub fn species_catalog(catalog: &PhenotypeCatalog) -> String {
    let mut out = String::from("known species:\n");
    for species in Species::ALL {
        let [top, mid, bottom] = species.triple();
        let _ = writeln!(
            out,
            "  {:<22} {top}/{mid}/{bottom}  {:>5} genotype(s)",
            species.label(),
            catalog.genotypes(species).len()
        );
    }
    out
}

pub fn listing(records: &[&IndividualRecord]) -> String {
    if records.is_empty() {
        return "no saved individuals\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let _ = writeln!(out, "{:<28} {}", r.name, r.display_species());
    }
    out
}

/// Species frequencies, most common first.
pub fn frequencies(counts: &[(Species, usize)], total: usize) -> String {
    let mut sorted = counts.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut out = String::new();
    for (species, count) in sorted {
        let share = if total == 0 {
            0.0
        } else {
            100.0 * count as f64 / total as f64
        };
        let _ = writeln!(out, "{:<22} {count:>8} {share:>7.2}%", species.label());
    }
    out
}

fn ranked(out: &mut String, title: &str, best: &RankedIndividual) {
    let _ = writeln!(out, "{title}: {} ({})", best.name, best.species);
    for (stat, value) in &best.values {
        let _ = writeln!(out, "  {:<22} {value}", stat.label());
    }
    let scores: Vec<String> = best.score.iter().map(|s| format!("{s:.3}")).collect();
    let _ = writeln!(out, "  score [{}]", scores.join(", "));
}

fn generation(out: &mut String, m: &GenerationMetrics) {
    let _ = writeln!(
        out,
        "generation {}: {} pair(s), {} birth(s), {} miscarriage(s), {} alive, {} species",
        m.generation, m.pairs, m.births, m.miscarriages, m.population_size, m.distinct_species
    );
}

fn baseline(out: &mut String, report: &BaselineReport) {
    let _ = writeln!(
        out,
        "random {} baseline over {} samples:",
        report.species, report.samples
    );
    for s in &report.stats {
        let _ = writeln!(
            out,
            "  {:<22} min {:.3}  avg {:.3}  max {:.3}",
            s.stat.label(),
            s.min,
            s.avg,
            s.max
        );
    }
}

pub fn status(status: &OptimizerStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "generation {}/{} with {} individual(s)",
        status.generation, status.target_generations, status.population_size
    );
    if let Some(m) = &status.last_generation {
        generation(&mut out, m);
    }
    if let Some(best) = &status.best {
        ranked(&mut out, "best so far", best);
    }
    out
}

pub fn summary(summary: &OptimizerSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "finished after {} generation(s)", summary.generations);
    if let Some(last) = summary.history.last() {
        generation(&mut out, last);
    }
    if let Some(report) = &summary.baseline {
        baseline(&mut out, report);
    }
    match &summary.best_overall {
        Some(best) => ranked(&mut out, "best overall", best),
        None => out.push_str("no individuals survived\n"),
    }
    if let Some(best) = &summary.best_of_target {
        ranked(&mut out, "best of target", best);
    }
    out
}
