#![deny(unsafe_code)]
//! DiaSim demo binary.
//!
//! Runs the bundled sample language through:
//! 1. a baseline simulation with stage-by-stage scoring
//! 2. three hypotheses (insertion, deletion, relocation), each compared
//!    against the baseline with differential derivations
//! 3. accepting the best hypothesis as the new baseline
//!
//! Set `RUST_LOG=debug` to see stage and comparison events.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use diasim_hypothesis::{DifferentialReport, Edit, EngineConfig, HypothesisEngine};
use diasim_metric::{evaluate_stage, phone_error_profile, FeatureEditDistance};
use diasim_rules::sample::{SampleLanguage, DARK_L};
use diasim_simulator::Simulation;
use diasim_types::StageKind;

// ── Formatting Helpers ──────────────────────────────────────────────────

const BANNER: &str = r#"
 ╔═══════════════════════════════════════════════════════════════╗
 ║              DiaSim  --  Sound Change Demo                   ║
 ║                                                              ║
 ║   Cascade simulation, feature edit distance and              ║
 ║   differential hypothesis testing.                           ║
 ╚═══════════════════════════════════════════════════════════════╝
"#;

fn section(title: &str) {
    let width: usize = 60;
    let pad = width.saturating_sub(title.chars().count() + 4);
    let left = pad / 2;
    let right = pad - left;
    println!();
    println!(" ┌{}┐", "─".repeat(width));
    println!(" │{}  {}  {}│", " ".repeat(left), title, " ".repeat(right));
    println!(" └{}┘", "─".repeat(width));
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn info(msg: &str) {
    println!("   [--]  {}", msg);
}

fn warn(msg: &str) {
    println!("   [!!]  {}", msg);
}

fn block(text: &str) {
    for line in text.lines() {
        println!("         {}", line);
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    println!("{}", BANNER);

    if let Err(e) = run_demo() {
        eprintln!();
        eprintln!("   [FATAL]  Demo failed: {:#}", e);
        std::process::exit(1);
    }

    println!();
    println!(" ════════════════════════════════════════════════════════════════");
    println!("  Demo complete.");
    println!(" ════════════════════════════════════════════════════════════════");
    println!();
}

fn run_demo() -> anyhow::Result<()> {
    // ── Phase A: Sample Language ────────────────────────────────────
    section("Phase A: Sample Language");

    let lang = SampleLanguage::build().context("building the sample language")?;
    info(&format!(
        "{} features, {} phones, {} etyma ({} unattested)",
        lang.inventory.feature_count(),
        lang.inventory.symbol_count(),
        lang.lexicon.len(),
        lang.lexicon.absent_count()
    ));
    for line in lang.cascade.listing() {
        info(&line);
    }

    // ── Phase B: Baseline Run ───────────────────────────────────────
    section("Phase B: Baseline Run");

    let config = EngineConfig::default();
    let mut sim = Simulation::with_config(
        lang.lexicon.clone(),
        lang.cascade.clone(),
        lang.stages.clone(),
        config.simulation.clone(),
    )?;
    let fed = FeatureEditDistance::new(&config.metric);
    while let Some(index) = sim.run_to_next_stage() {
        let Some(stage) = sim.stages().get(index) else {
            continue;
        };
        match stage.kind() {
            StageKind::Gold => {
                let snapshot = sim.result_at(index).cloned().unwrap_or_default();
                let report = evaluate_stage(stage, &snapshot, &fed)?;
                ok(&format!(
                    "{:<8} after rule {:>2}  accuracy {:.3}  mean FED {:.3}",
                    stage.name(),
                    sim.position(),
                    report.accuracy().unwrap_or(0.0),
                    report.average_feature_distance().unwrap_or(0.0)
                ));
                for id in report.mismatches() {
                    warn(&format!("mismatch at etymon {}", id));
                }
                if let Some(reference) = stage.reference() {
                    let profile = phone_error_profile(reference, &report);
                    for (symbol, likelihood) in profile.by_miss_likelihood() {
                        if likelihood > 0.0 {
                            info(&format!("phone {:<3} miss likelihood {:.2}", symbol, likelihood));
                        }
                    }
                }
            }
            StageKind::Black => info(&format!(
                "{:<8} after rule {:>2}  (no reference)",
                stage.name(),
                sim.position()
            )),
        }
    }
    for (id, form) in sim.current_result().iter() {
        info(&format!("{:>2}  {}", id, form));
    }

    let mut engine = HypothesisEngine::from_simulation(sim, config)?;
    tracing::info!(
        etyma = engine.input().len(),
        rules = engine.baseline().len(),
        "Hypothesis engine ready"
    );

    // ── Phase C: Deletion ───────────────────────────────────────────
    section("Phase C: Hypothesis 1  (delete e-raising)");

    engine.apply(Edit::delete(7), "e > i / __ n did not apply")?;
    let report = engine.generate_comparison()?;
    print_report(&report)?;
    engine.discard();
    info("hypothesis discarded");

    // ── Phase D: Relocation ─────────────────────────────────────────
    section("Phase D: Hypothesis 2  (flap d after apocope)");

    engine.apply(Edit::relocate(1, 6), "d-flapping follows apocope")?;
    let report = engine.generate_comparison()?;
    print_report(&report)?;
    for line in report.timeline_listing().iter().take(8) {
        info(line);
    }
    engine.discard();
    info("hypothesis discarded");

    // ── Phase E: Insertion ──────────────────────────────────────────
    section("Phase E: Hypothesis 3  (dark l)");

    engine.propose_insert(0, DARK_L, &lang.compiler, "velarized l before consonants")?;
    for change in engine.change_log().iter() {
        info(&format!("logged  {}", change));
    }
    let report = engine.generate_comparison()?;
    print_report(&report)?;

    let summary = serde_json::to_string_pretty(&report.summary())?;
    info("summary:");
    block(&summary);

    engine.accept()?;
    ok(&format!(
        "accepted: baseline now has {} rules, stages at {:?}",
        engine.baseline().len(),
        engine.baseline_stages().positions()
    ));
    let check = engine.generate_comparison()?;
    ok(&format!(
        "re-comparison divergence: {:?}",
        check.divergence_point()
    ));

    Ok(())
}

fn print_report(report: &DifferentialReport) -> anyhow::Result<()> {
    match report.divergence_point() {
        Some(dp) => info(&format!("divergence at global slot {}", dp)),
        None => info("no divergence"),
    }
    for (slot, changes) in report.changed_rule_effects() {
        info(&format!(
            "slot {:>2}: {} lost, {} gained, {} blocked downstream",
            slot,
            changes.lost.len(),
            changes.gained.len(),
            report.effects_blocked(*slot)
        ));
    }
    for id in report.etyma_with_changed_derivations() {
        ok(&format!("etymon {} diverges", id));
        block(report.differential_derivation(id));
    }
    for stage in 0..report.baseline().stages().len() {
        let gold = report
            .baseline()
            .stages()
            .get(stage)
            .is_some_and(|s| s.kind() == StageKind::Gold);
        if !gold {
            continue;
        }
        let delta = report.accuracy_at(stage)?;
        info(&format!(
            "{:<8} accuracy {:.3} -> {:.3}",
            delta.stage,
            delta.baseline.accuracy().unwrap_or(0.0),
            delta.hypothesis.accuracy().unwrap_or(0.0)
        ));
    }
    Ok(())
}
