/// Two-row dynamic-programming Levenshtein distance. Hand-rolled: this is
/// core suggestion logic the spec names explicitly, not ambient plumbing a
/// crate would cover.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn fail_limit(v: &str) -> usize {
    if v.chars().count() <= 3 {
        1
    } else {
        2
    }
}

/// `argmin_{c in candidates} levenshtein(v, c)`, gated by `fail_limit`, with
/// ties broken by first occurrence in `candidates`' iteration order.
pub fn suggest<'a, I>(v: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = fail_limit(v);
    let mut best: Option<(&'a str, usize)> = None;
    for c in candidates {
        let d = levenshtein(v, c);
        if d > limit {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((c, d)),
        }
    }
    best.map(|(c, _)| c)
}
