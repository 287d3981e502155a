use std::fmt::Write;

/// Most comments read out per post.
pub const MAX_COMMENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub body: String,
}

impl Comment {
    pub fn new(author: Option<String>, body: impl Into<String>) -> Self {
        let author = author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            author,
            body: body.into(),
        }
    }
}

/// The readable part of a post: title, optional self text and top comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub body: Option<String>,
    pub comments: Vec<Comment>,
}

impl ExtractedContent {
    /// Build content from raw post fields.
    ///
    /// Empty bodies are dropped, comments without text are skipped and at
    /// most [`MAX_COMMENTS`] are kept, in their original order.
    pub fn new(
        title: impl Into<String>,
        body: Option<String>,
        comments: impl IntoIterator<Item = Comment>,
    ) -> Self {
        let body = body.filter(|b| !b.trim().is_empty());
        let comments = comments
            .into_iter()
            .filter(|c| !c.body.trim().is_empty())
            .take(MAX_COMMENTS)
            .collect();

        Self {
            title: title.into(),
            body,
            comments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.body.is_none() && self.comments.is_empty()
    }

    /// Flatten into the single string handed to the speech engine.
    pub fn narration_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Post Title: {}", self.title);

        if let Some(body) = &self.body {
            let _ = write!(text, "\nPost Content:\n{}\n", body);
        }

        if !self.comments.is_empty() {
            text.push_str("\nTop Comments:\n");
            for (index, comment) in self.comments.iter().enumerate() {
                let _ = write!(
                    text,
                    "\nComment {} by {}:\n{}\n",
                    index + 1,
                    comment.author,
                    comment.body
                );
            }
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(n: usize) -> Vec<Comment> {
        (1..=n)
            .map(|i| Comment::new(Some(format!("user{}", i)), format!("comment body {}", i)))
            .collect()
    }

    fn comment_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with("Comment ")).collect()
    }

    #[test]
    fn test_title_only() {
        let content = ExtractedContent::new("Hello", None, Vec::new());
        assert_eq!(content.narration_text(), "Post Title: Hello\n");
    }

    #[test]
    fn test_body_and_comments() {
        let content = ExtractedContent::new("Hello", Some("World".into()), comments(2));
        assert_eq!(
            content.narration_text(),
            "Post Title: Hello\n\
             \nPost Content:\nWorld\n\
             \nTop Comments:\n\
             \nComment 1 by user1:\ncomment body 1\n\
             \nComment 2 by user2:\ncomment body 2\n"
        );
    }

    #[test]
    fn test_comments_truncated_to_ten_in_order() {
        let content = ExtractedContent::new("Many", None, comments(15));
        let text = content.narration_text();
        let lines = comment_lines(&text);

        assert_eq!(lines.len(), MAX_COMMENTS);
        assert_eq!(lines[0], "Comment 1 by user1:");
        assert_eq!(lines[9], "Comment 10 by user10:");
        assert!(!text.contains("comment body 11"));
    }

    #[test]
    fn test_fewer_than_ten_kept_whole() {
        let content = ExtractedContent::new("Few", None, comments(3));
        assert_eq!(comment_lines(&content.narration_text()).len(), 3);
    }

    #[test]
    fn test_empty_body_and_empty_comment_omitted() {
        let content = ExtractedContent::new(
            "Question",
            Some(String::new()),
            vec![Comment::new(Some("someone".into()), "")],
        );
        let text = content.narration_text();

        assert_eq!(content.body, None);
        assert!(content.comments.is_empty());
        assert!(!text.contains("Post Content"));
        assert!(!text.contains("Top Comments"));
        assert!(!text.contains("someone"));
    }

    #[test]
    fn test_empty_comments_do_not_consume_slots() {
        let mut input = vec![Comment::new(None, "  ")];
        input.extend(comments(10));
        let content = ExtractedContent::new("Gaps", None, input);

        assert_eq!(content.comments.len(), MAX_COMMENTS);
        assert_eq!(content.comments[0].author, "user1");
    }

    #[test]
    fn test_missing_author_is_unknown() {
        let comment = Comment::new(None, "text");
        assert_eq!(comment.author, "unknown");
    }

    #[test]
    fn test_is_empty() {
        assert!(ExtractedContent::new("", None, Vec::new()).is_empty());
        assert!(!ExtractedContent::new("Title", None, Vec::new()).is_empty());
    }
}
