//! Independent two-sample t-test.

use async_trait::async_trait;
use serde::Serialize;

use dataplan_core::stats::{mean, variance};
use dataplan_core::tool_trait::{bool_arg, str_arg};
use dataplan_core::{AnalysisContext, AnalysisTool, ArgMap, CoreError, CoreResult, ToolOutput};

use super::{artifact_path, group_rows, values_at};

const EXPECTED_GROUPS: usize = 2;

/// Result of a two-sample t-test, written both as preview and artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestResult {
    pub group_1: String,
    pub group_2: String,
    pub n_1: usize,
    pub n_2: usize,
    pub mean_1: f64,
    pub mean_2: f64,
    pub t_stat: f64,
    pub df: f64,
    pub p_value: f64,
    pub equal_var: bool,
}

/// Compare `value_column` between the two levels of `group_column`.
/// Welch's test unless `equal_var` is true.
pub struct TTestTool;

#[async_trait]
impl AnalysisTool for TTestTool {
    fn name(&self) -> &str {
        "t_test"
    }

    fn description(&self) -> &str {
        "Independent two-sample t-test between the two levels of a group"
    }

    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput> {
        let ds = ctx.dataset();
        let group_column = str_arg(args, "group_column")
            .ok_or_else(|| CoreError::tool("t_test requires 'group_column'"))?;
        let value_column = str_arg(args, "value_column")
            .ok_or_else(|| CoreError::tool("t_test requires 'value_column'"))?;
        let equal_var = bool_arg(args, "equal_var").unwrap_or(false);

        let groups = group_rows(ds.require_column(group_column)?, ds.num_rows());
        if groups.len() != EXPECTED_GROUPS {
            return Err(CoreError::tool(format!(
                "t_test expects exactly {} groups in '{}', found {}.",
                EXPECTED_GROUPS,
                group_column,
                groups.len()
            )));
        }
        let values = ds.numeric(value_column)?;
        let (label_1, rows_1) = &groups[0];
        let (label_2, rows_2) = &groups[1];
        let sample_1 = values_at(values, rows_1);
        let sample_2 = values_at(values, rows_2);

        let test = two_sample_t(&sample_1, &sample_2, equal_var)?;
        let result = TTestResult {
            group_1: label_1.clone(),
            group_2: label_2.clone(),
            n_1: sample_1.len(),
            n_2: sample_2.len(),
            mean_1: test.mean_1,
            mean_2: test.mean_2,
            t_stat: test.t,
            df: test.df,
            p_value: test.p_value,
            equal_var,
        };

        let path = artifact_path(ctx, "ttest", "json")?;
        std::fs::write(&path, serde_json::to_string_pretty(&result)?)?;

        Ok(ToolOutput::preview(serde_json::to_value(&result)?).with_artifact(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TwoSample {
    pub mean_1: f64,
    pub mean_2: f64,
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
}

pub(crate) fn two_sample_t(a: &[f64], b: &[f64], equal_var: bool) -> CoreResult<TwoSample> {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (Some(m1), Some(v1), Some(m2), Some(v2)) = (mean(a), variance(a), mean(b), variance(b))
    else {
        return Err(CoreError::tool(format!(
            "t_test needs at least 2 observations per group, got {} and {}",
            a.len(),
            b.len()
        )));
    };

    let (se, df) = if equal_var {
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0);
        ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0)
    } else {
        let (s1, s2) = (v1 / n1, v2 / n2);
        let df = (s1 + s2).powi(2) / (s1.powi(2) / (n1 - 1.0) + s2.powi(2) / (n2 - 1.0));
        ((s1 + s2).sqrt(), df)
    };
    if se == 0.0 || !se.is_finite() {
        return Err(CoreError::tool(
            "t_test is undefined when both groups have zero variance",
        ));
    }

    let t = (m1 - m2) / se;
    Ok(TwoSample {
        mean_1: m1,
        mean_2: m2,
        t,
        df,
        p_value: two_sided_p(t, df),
    })
}

/// Two-sided p-value of Student's t distribution with `df` degrees of freedom.
pub(crate) fn two_sided_p(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn regularized_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    // Continued fraction converges fast below the mean; use symmetry above it
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-14;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation of `ln Γ(x)` for `x > 0`.
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = COEF[0];
    for (i, &c) in COEF.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}
