//! Joining a base URL with relative resource paths.

/// Strip empty segments from a resource path so `"/categories/"`,
/// `"categories"` and `"categories//"` all become `"categories"`.
pub fn normalize_resource(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join `base` and `path` with exactly one slash between every segment.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = normalize_resource(path);
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080/api";

    #[test]
    fn slashes_on_either_side_collapse() {
        for path in ["quizzes", "/quizzes", "quizzes/", "/quizzes/", "//quizzes//"] {
            assert_eq!(join_url(BASE, path), "http://localhost:8080/api/quizzes", "{path}");
        }
    }

    #[test]
    fn trailing_slash_on_base_is_stripped() {
        assert_eq!(
            join_url("http://localhost:8080/api/", "categories/3"),
            "http://localhost:8080/api/categories/3"
        );
    }

    #[test]
    fn nested_paths_keep_their_segments() {
        assert_eq!(
            join_url(BASE, "quizzes//questions/7/answers/"),
            "http://localhost:8080/api/quizzes/questions/7/answers"
        );
    }

    #[test]
    fn empty_path_yields_base() {
        assert_eq!(join_url(BASE, ""), BASE);
        assert_eq!(join_url(BASE, "/"), BASE);
    }

    #[test]
    fn scheme_separator_is_untouched() {
        assert_eq!(join_url("https://quiz.example", "reviews/1"), "https://quiz.example/reviews/1");
    }
}
