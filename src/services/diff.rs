use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::diff::DiffToken;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // word runs, whitespace runs, or a single punctuation char
    RE.get_or_init(|| Regex::new(r"\w+|\s+|[^\w\s]").unwrap())
}

pub fn tokenize(text: &str) -> Vec<&str> {
    token_re().find_iter(text).map(|m| m.as_str()).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Removed,
    Added,
}

/// Word-level diff of `original` against `revised`.
///
/// Tokens come from [`tokenize`]; the edit script is a minimal one found by
/// Myers' O((N+M)·D) algorithm in its linear-space form. Inside each changed
/// hunk all removals come before all additions, and neighbouring tokens of
/// the same kind are merged into one run.
pub fn word_diff(original: Option<&str>, revised: Option<&str>) -> Vec<DiffToken> {
    let a = tokenize(original.unwrap_or(""));
    let b = tokenize(revised.unwrap_or(""));

    let max_d = max_d(a.len(), b.len());
    let mut vf = V::new(max_d);
    let mut vb = V::new(max_d);
    let mut ops: Vec<(Op, &str)> = Vec::with_capacity(a.len() + b.len());
    conquer(&a, 0..a.len(), &b, 0..b.len(), &mut vf, &mut vb, &mut ops);

    merge(reorder_hunks(ops))
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

/// Furthest-reaching x per diagonal k, indexed from -max_d to max_d.
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        V {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl std::ops::Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl std::ops::IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

// Point where a forward and a backward D-path overlap, in absolute token
// coordinates.
fn middle_snake(
    a: &[&str],
    ar: Range<usize>,
    b: &[&str],
    br: Range<usize>,
    vf: &mut V,
    vb: &mut V,
) -> Option<(usize, usize)> {
    let n = ar.len();
    let m = br.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);

            if x < n && y < m {
                x += common_prefix(&a[ar.start + x..ar.end], &b[br.start + y..br.end]);
            }
            vf[k] = x;

            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0 + ar.start, y0 + br.start));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            if x < n && y < m {
                let run = common_suffix(&a[ar.start..ar.end - x], &b[br.start..br.end - y]);
                x += run;
                y += run;
            }
            vb[k] = x;

            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((n - x + ar.start, m - y + br.start));
            }
        }
    }

    None
}

fn conquer<'a>(
    a: &[&'a str],
    mut ar: Range<usize>,
    b: &[&'a str],
    mut br: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    ops: &mut Vec<(Op, &'a str)>,
) {
    let prefix = common_prefix(&a[ar.clone()], &b[br.clone()]);
    ops.extend(a[ar.start..ar.start + prefix].iter().map(|t| (Op::Equal, *t)));
    ar.start += prefix;
    br.start += prefix;

    let suffix = common_suffix(&a[ar.clone()], &b[br.clone()]);
    let tail = ar.end - suffix..ar.end;
    ar.end -= suffix;
    br.end -= suffix;

    if ar.is_empty() {
        ops.extend(b[br].iter().map(|t| (Op::Added, *t)));
    } else if br.is_empty() {
        ops.extend(a[ar].iter().map(|t| (Op::Removed, *t)));
    } else if let Some((x, y)) = middle_snake(a, ar.clone(), b, br.clone(), vf, vb) {
        conquer(a, ar.start..x, b, br.start..y, vf, vb, ops);
        conquer(a, x..ar.end, b, y..br.end, vf, vb, ops);
    } else {
        ops.extend(a[ar].iter().map(|t| (Op::Removed, *t)));
        ops.extend(b[br].iter().map(|t| (Op::Added, *t)));
    }

    ops.extend(a[tail].iter().map(|t| (Op::Equal, *t)));
}

fn reorder_hunks(ops: Vec<(Op, &str)>) -> Vec<(Op, &str)> {
    let mut out = Vec::with_capacity(ops.len());
    let mut added: Vec<(Op, &str)> = Vec::new();
    for op in ops {
        match op.0 {
            Op::Equal => {
                out.append(&mut added);
                out.push(op);
            }
            Op::Removed => out.push(op),
            Op::Added => added.push(op),
        }
    }
    out.append(&mut added);
    out
}

fn merge(ops: Vec<(Op, &str)>) -> Vec<DiffToken> {
    let mut runs: Vec<(Op, String)> = Vec::new();
    for (op, text) in ops {
        match runs.last_mut() {
            Some((last, buf)) if *last == op => buf.push_str(text),
            _ => runs.push((op, text.to_string())),
        }
    }

    runs.into_iter()
        .map(|(op, text)| match op {
            Op::Equal => DiffToken::Equal { text },
            Op::Removed => DiffToken::Removed { text },
            Op::Added => DiffToken::Added { text },
        })
        .collect()
}
