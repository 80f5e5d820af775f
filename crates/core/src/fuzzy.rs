//! Fuzzy map-name matching for MapFinder.

/// Lowercase, trim and collapse internal whitespace runs to one space.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Edit distance with unit insertion, deletion and substitution costs.
///
/// Transpositions count as two edits. Only two DP rows are kept, sized by the
/// shorter input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Effective distance of a typed guess against the true map name.
///
/// A guess that equals the name once spaces are removed from both is an exact
/// hit.
/// Otherwise every word of the guess is compared on its own against the whole
/// name and the closest word wins, so extra words ("the narva map") are not
/// penalised.
pub fn name_distance(guess: &str, true_name: &str) -> usize {
    let guess = normalize(guess);
    let target = normalize(true_name);

    if compact(&guess) == compact(&target) {
        return 0;
    }

    // `split(' ')` on an empty guess yields one empty word, matching a blank input.
    guess
        .split(' ')
        .map(|word| levenshtein(&target, word))
        .min()
        .unwrap_or(target.chars().count())
}
