//! Comment preservation and statement chaining.

use super::format::{prefix_lines, wrap};
use super::CodeGenerator;
use crate::block::{Block, InputKind};
use crate::errors::Result;

impl CodeGenerator {
    /// Surrounds the raw `code` of `block` with its comments and, unless
    /// `this_only`, appends the code of the following statements.
    ///
    /// Comments are only collected for blocks that are not inlined into a
    /// parent expression; the parent collects those.
    pub fn scrub(&mut self, block: &dyn Block, code: &str, this_only: bool) -> Result<String> {
        let mut comment_code = String::new();
        if !block.is_output_connected() {
            if let Some(comment) = block.comment_text() {
                let width = self.config().comment_wrap.saturating_sub(3).max(1);
                comment_code.push_str(&prefix_lines(&wrap(comment, width), "// "));
                comment_code.push('\n');
            }
            for input in block.inputs() {
                if input.kind != InputKind::Value {
                    continue;
                }
                if let Some(child) = input.target {
                    let nested = all_nested_comments(child);
                    if !nested.is_empty() {
                        comment_code.push_str(&prefix_lines(&nested, "// "));
                    }
                }
            }
        }

        let next_code = if this_only {
            String::new()
        } else {
            self.chain_to_code(block.next_block())?
        };

        Ok(format!("{comment_code}{code}{next_code}"))
    }
}

/// Every comment in the expression rooted at `block`, block before its
/// children, one per line with a trailing newline. Statement inputs are
/// not entered.
pub fn all_nested_comments(block: &dyn Block) -> String {
    let mut comments = Vec::new();
    collect_comments(block, &mut comments);
    if comments.is_empty() {
        return String::new();
    }
    comments.push(String::new());
    comments.join("\n")
}

fn collect_comments(block: &dyn Block, comments: &mut Vec<String>) {
    if let Some(comment) = block.comment_text() {
        comments.push(comment.to_string());
    }
    for input in block.inputs() {
        if input.kind == InputKind::Value {
            if let Some(child) = input.target {
                collect_comments(child, comments);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockNode;

    fn text(value: &str) -> BlockNode {
        BlockNode::new("text").with_field("TEXT", value)
    }

    #[test]
    fn test_scrub_without_comments_or_next_is_identity() {
        let mut generator = CodeGenerator::new();
        let block = BlockNode::new("text_print");
        let once = generator.scrub(&block, "message('a');\n", false).unwrap();
        assert_eq!(once, "message('a');\n");
        let twice = generator.scrub(&block, &once, false).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_scrub_prefixes_block_comment() {
        let mut generator = CodeGenerator::new();
        let block = BlockNode::new("text_print").with_comment("greet the user");
        assert_eq!(
            generator.scrub(&block, "message('a');\n", true).unwrap(),
            "// greet the user\nmessage('a');\n"
        );
    }

    #[test]
    fn test_scrub_wraps_long_comments() {
        let mut config = crate::config::GeneratorConfig::default();
        config.comment_wrap = 13;
        let mut generator = CodeGenerator::with_config(config);
        let block = BlockNode::new("text_print").with_comment("one two three four");
        assert_eq!(
            generator.scrub(&block, "", true).unwrap(),
            "// one two\n// three four\n"
        );
    }

    #[test]
    fn test_scrub_collects_value_input_comments() {
        let mut generator = CodeGenerator::new();
        let block = BlockNode::new("text_print").with_value(
            "TEXT",
            BlockNode::new("text_length")
                .with_comment("outer")
                .with_value("VALUE", text("a").with_comment("inner")),
        );
        assert_eq!(
            generator.scrub(&block, "x;\n", true).unwrap(),
            "// outer\n// inner\nx;\n"
        );
    }

    #[test]
    fn test_scrub_skips_comments_of_inlined_blocks() {
        let mut generator = CodeGenerator::new();
        let parent = BlockNode::new("text_print").with_value("TEXT", text("a").with_comment("c"));
        let child = parent.input_target("TEXT").unwrap();
        assert_eq!(generator.scrub(child, "'a'", true).unwrap(), "'a'");
    }

    #[test]
    fn test_scrub_appends_next_statement() {
        let mut generator = CodeGenerator::new();
        let block = BlockNode::new("text_print").with_next(BlockNode::new("text_print").with_value("TEXT", text("b")));
        assert_eq!(
            generator.scrub(&block, "message('a');\n", false).unwrap(),
            "message('a');\nmessage('b');\n"
        );
        assert_eq!(
            generator.scrub(&block, "message('a');\n", true).unwrap(),
            "message('a');\n"
        );
    }

    #[test]
    fn test_all_nested_comments_ignores_statement_inputs() {
        let block = BlockNode::new("controls_whileUntil")
            .with_comment("loop")
            .with_statement("DO", BlockNode::new("text_print").with_comment("body"));
        assert_eq!(all_nested_comments(&block), "loop\n");
        assert_eq!(all_nested_comments(&text("a")), "");
    }
}
