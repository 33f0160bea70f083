use super::*;

#[test]
fn test_normalize_lowercases_and_strips_punctuation() {
    assert_eq!(normalize("OK Computer"), "ok computer");
    assert_eq!(normalize("Radiohead - OK Computer"), "radiohead ok computer");
    assert_eq!(normalize("Sgt. Pepper's Lonely Hearts Club Band"), "sgt peppers lonely hearts club band");
}

#[test]
fn test_normalize_collapses_whitespace() {
    assert_eq!(normalize("  Kid \t  A \n"), "kid a");
}

#[test]
fn test_normalize_folds_diacritics() {
    assert_eq!(normalize("Björk"), "bjork");
    assert_eq!(normalize("Sigur Rós"), normalize("Sigur Ros"));
    assert_eq!(normalize("Beyoncé"), "beyonce");
}

#[test]
fn test_normalize_removes_leading_article() {
    assert_eq!(normalize("The Smiths"), "smiths");
    assert_eq!(normalize("A Tribe Called Quest"), "tribe called quest");
    assert_eq!(normalize("An Awesome Wave"), "awesome wave");
}

#[test]
fn test_normalize_keeps_article_inside_title() {
    assert_eq!(normalize("Meet the Beatles"), "meet the beatles");
    assert_eq!(normalize("Theatre"), "theatre");
}

#[test]
fn test_normalize_keeps_lone_article() {
    assert_eq!(normalize("The"), "the");
    assert_eq!(normalize("the the"), "the");
}

#[test]
fn test_normalize_is_idempotent() {
    let inputs = [
        "The The",
        "The A Team",
        "  Sigur Rós — ( ) Untitled ",
        "AC/DC",
        "",
        "!!!",
        "Ⅻ ﬁnal ǅ",
        "İstanbul",
        "The Beatles (Remastered) [2009]",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn test_normalize_empty_and_symbol_only() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("?!"), "");
    assert_eq!(normalize("snake_case"), "snake_case");
}

#[test]
fn test_base_title_strips_trailing_groups() {
    assert_eq!(base_title("OK Computer (Collector's Edition)"), "OK Computer");
    assert_eq!(base_title("Abbey Road (Remastered) [Vinyl]"), "Abbey Road");
    assert_eq!(base_title("Nevermind (Super (Deluxe) Edition)"), "Nevermind");
}

#[test]
fn test_base_title_keeps_leading_group() {
    assert_eq!(
        base_title("(What's the Story) Morning Glory?"),
        "(What's the Story) Morning Glory?"
    );
    assert_eq!(base_title("(Untitled)"), "(Untitled)");
}

#[test]
fn test_base_title_strips_featuring_clause() {
    assert_eq!(base_title("Stay feat. Justin Bieber"), "Stay");
    assert_eq!(base_title("Love Me ft. Drake (Remix)"), "Love Me");
    assert_eq!(base_title("Ivy Featuring Nobody"), "Ivy");
}

#[test]
fn test_base_title_plain() {
    assert_eq!(base_title("  In Rainbows "), "In Rainbows");
    assert_eq!(base_title("Hail to the Thief"), "Hail to the Thief");
    assert_eq!(base_title(""), "");
}

#[test]
fn test_base_title_unbalanced_bracket() {
    assert_eq!(base_title("Weird Title)"), "Weird Title)");
}
