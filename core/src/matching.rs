//! String matching primitives used by the fuzzy and wildcard queries.

/// Levenshtein distance between `a` and `b`, counted in characters.
///
/// Keeps only two rows of the `(|a|+1) x (|b|+1)` table.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let step = prev[j].min(curr[j - 1]) + 1;
            let diag = if a[i - 1] == b[j - 1] { prev[j - 1] } else { prev[j - 1] + 1 };
            curr[j] = diag.min(step);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Anchored wildcard match: `?` matches exactly one character, `*` matches
/// any run of characters including the empty one.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    // m[i][j]: first i pattern chars match first j text chars.
    let width = t.len() + 1;
    let mut m = vec![false; (p.len() + 1) * width];
    m[0] = true;
    for i in 1..=p.len() {
        m[i * width] = p[i - 1] == '*' && m[(i - 1) * width];
    }
    for i in 1..=p.len() {
        for j in 1..=t.len() {
            m[i * width + j] = match p[i - 1] {
                '*' => m[i * width + j - 1] || m[(i - 1) * width + j],
                '?' => m[(i - 1) * width + j - 1],
                c if c == t[j - 1] => m[(i - 1) * width + j - 1],
                _ => false,
            };
        }
    }
    m[p.len() * width + t.len()]
}

/// Returns true when `term` contains a wildcard character.
pub fn has_wildcard(term: &str) -> bool {
    term.contains(['*', '?'])
}
