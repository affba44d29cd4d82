//! Title → seniority ladder mapping used by the career-trajectory dimension.
//!
//! Rungs are monotone in conventional career order:
//! intern 0, junior 1, unmarked IC 2, senior 3, staff/lead/manager 4,
//! principal 5, director 6, vp 7, c-level 8.

/// Maps a job title to its ladder rung. Most specific markers are checked
/// first so "Senior Manager" lands above "Manager".
pub fn title_rung(title: &str) -> u8 {
    let t = title.to_lowercase();
    let has = |needle: &str| t.contains(needle);

    if has("chief") || has("cto") || has("ceo") || has("founder") || has("president") {
        return 8;
    }
    if has("vp") || has("vice president") {
        return 7;
    }
    if has("director") || has("head of") {
        return 6;
    }
    if has("principal") || (has("senior") && has("manager")) || has("distinguished") {
        return 5;
    }
    if has("staff") || has("lead") || has("manager") {
        return 4;
    }
    if has("senior") || has("sr.") || has("sr ") {
        return 3;
    }
    if has("intern") {
        return 0;
    }
    if has("junior") || has("associate") || has("entry") || has("trainee") {
        return 1;
    }
    2
}

/// Coarse functional area of a title, used for the cross-function breadth
/// bonus.
pub fn function_category(title: &str) -> &'static str {
    let t = title.to_lowercase();
    let has = |needle: &str| t.contains(needle);

    if has("research") || has("scientist") {
        "research"
    } else if has("product") || has("design") {
        "product"
    } else if has("data") || has("analytics") || has("analyst") {
        "data"
    } else if has("manager") || has("director") || has("vp") || has("chief") || has("head of") {
        "management"
    } else if has("engineer") || has("developer") || has("architect") || has("sre") || has("devops")
    {
        "engineering"
    } else {
        "other"
    }
}
