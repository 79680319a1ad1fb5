//! Edit-distance matching used to surface history entries with small typos.

use crate::constants::history::FUZZY_MAX_DISTANCE;

/// Levenshtein distance over Unicode scalar values, using the full DP table.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in dp[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let substitution = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + substitution);
        }
    }

    dp[a.len()][b.len()]
}

/// Case-insensitive near-equality: true when at most two edits apart.
#[must_use]
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    levenshtein(&a.to_lowercase(), &b.to_lowercase()) <= FUZZY_MAX_DISTANCE
}
