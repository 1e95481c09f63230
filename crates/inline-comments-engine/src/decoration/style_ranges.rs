use std::ops::Range;

use crate::document::{CharacterMetadata, ContentBlock};

/// Maximal runs of adjacent items that are equal under `are_equal`, keeping
/// the runs whose first item passes `filter`
pub fn find_ranges<T>(
    items: &[T],
    are_equal: impl Fn(&T, &T) -> bool,
    filter: impl Fn(&T) -> bool,
) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for end in 1..=items.len() {
        if end == items.len() || !are_equal(&items[start], &items[end]) {
            if filter(&items[start]) {
                ranges.push(start..end);
            }
            start = end;
        }
    }
    ranges
}

/// Runs of characters sharing the same style set
pub fn find_style_ranges(
    block: &ContentBlock,
    filter: impl Fn(&CharacterMetadata) -> bool,
) -> Vec<Range<usize>> {
    find_ranges(&block.characters, |a, b| a.styles == b.styles, filter)
}

/// Runs of characters sharing the same entity
pub fn find_entity_ranges(
    block: &ContentBlock,
    filter: impl Fn(&CharacterMetadata) -> bool,
) -> Vec<Range<usize>> {
    find_ranges(&block.characters, |a, b| a.entity == b.entity, filter)
}

/// Style ranges passing `filter`, split so no range crosses an entity.
///
/// Ranges come back in block order and never overlap each other or any
/// character that carries an entity.
pub fn find_comment_style_ranges(
    block: &ContentBlock,
    filter: impl Fn(&CharacterMetadata) -> bool,
) -> Vec<Range<usize>> {
    let entity_ranges = find_entity_ranges(block, |character| character.entity.is_some());

    let mut ranges = Vec::new();
    for style_range in find_style_ranges(block, filter) {
        let mut cursor = style_range.start;
        for entity in entity_ranges
            .iter()
            .filter(|entity| entity.end > style_range.start && entity.start < style_range.end)
        {
            if entity.start > cursor {
                ranges.push(cursor..entity.start);
            }
            cursor = cursor.max(entity.end);
        }
        if cursor < style_range.end {
            ranges.push(cursor..style_range.end);
        }
    }
    ranges
}

/// Comment-highlighted ranges of a block, the ranges that get decorated
pub fn comment_ranges(block: &ContentBlock) -> Vec<Range<usize>> {
    find_comment_style_ranges(block, CharacterMetadata::has_comment_style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EntityKey;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn test_find_ranges_groups_equal_runs() {
        let items = [1, 1, 2, 2, 2, 1, 3];
        assert_eq!(
            find_ranges(&items, |a, b| a == b, |_| true),
            vec![0..2, 2..5, 5..6, 6..7]
        );
        assert_eq!(
            find_ranges(&items, |a, b| a == b, |item| *item == 1),
            vec![0..2, 5..6]
        );
        assert!(find_ranges::<u8>(&[], |a, b| a == b, |_| true).is_empty());
    }

    #[test]
    fn test_style_ranges_split_on_style_set_change() {
        let block = ContentBlock::new("a", "aaaabbbbcc")
            .with_style(0..8, "COMMENT-1")
            .with_style(4..8, "BOLD");
        assert_eq!(comment_ranges(&block), vec![0..4, 4..8]);
    }

    #[test]
    fn test_entity_splits_comment_range() {
        let block = ContentBlock::new("a", "0123456789")
            .with_style(0..10, "COMMENT-1")
            .with_entity(3..5, EntityKey(0));
        assert_eq!(comment_ranges(&block), vec![0..3, 5..10]);
    }

    #[test]
    fn test_entity_at_edges_and_adjacent_entities() {
        let block = ContentBlock::new("a", "0123456789")
            .with_style(0..10, "COMMENT-1")
            .with_entity(0..2, EntityKey(0))
            .with_entity(2..4, EntityKey(1))
            .with_entity(8..10, EntityKey(2));
        assert_eq!(comment_ranges(&block), vec![4..8]);
    }

    #[test]
    fn test_fully_covered_by_entity_emits_nothing() {
        let block = ContentBlock::new("a", "abc")
            .with_style(0..3, "COMMENT-1")
            .with_entity(0..3, EntityKey(0));
        assert!(comment_ranges(&block).is_empty());
    }

    #[test]
    fn test_entity_larger_than_style_range() {
        let block = ContentBlock::new("a", "0123456789")
            .with_style(4..6, "COMMENT-1")
            .with_style(7..9, "COMMENT-1")
            .with_entity(2..8, EntityKey(0));
        assert_eq!(comment_ranges(&block), vec![8..9]);
    }

    #[test]
    fn test_custom_filter() {
        let block = ContentBlock::new("a", "0123456789")
            .with_style(0..10, "COMMENT-5")
            .with_style(0..4, "COMMENT-7");
        let ranges = find_comment_style_ranges(&block, |c| c.has_style("COMMENT-7"));
        assert_eq!(ranges, vec![0..4]);
    }

    /// Emitted ranges never touch entity characters, never overlap, and
    /// together cover exactly the commented characters without entities.
    #[test]
    fn test_ranges_cover_commented_characters_minus_entities() {
        let cases = [
            ContentBlock::new("a", "abcdefghijklmnopqrst")
                .with_style(0..7, "COMMENT-1")
                .with_style(5..15, "COMMENT-2")
                .with_style(2..12, "BOLD")
                .with_entity(3..6, EntityKey(0))
                .with_entity(10..11, EntityKey(1))
                .with_entity(14..18, EntityKey(2)),
            ContentBlock::new("b", "abcdefghij")
                .with_style(1..9, "COMMENT-3")
                .with_entity(0..10, EntityKey(0)),
            ContentBlock::new("c", "abcdefghij")
                .with_style(0..2, "COMMENT-3")
                .with_style(4..6, "COMMENT-4")
                .with_style(8..10, "COMMENT-3"),
        ];

        for block in &cases {
            let ranges = comment_ranges(block);

            let mut covered = BTreeSet::new();
            for range in &ranges {
                assert!(range.start < range.end);
                for offset in range.clone() {
                    assert!(covered.insert(offset), "offset {offset} emitted twice");
                    assert!(block.characters[offset].entity.is_none());
                }
            }
            for pair in ranges.windows(2) {
                assert!(pair[0].end <= pair[1].start);
            }

            let expected: BTreeSet<usize> = block
                .characters
                .iter()
                .enumerate()
                .filter(|(_, c)| c.has_comment_style() && c.entity.is_none())
                .map(|(offset, _)| offset)
                .collect();
            assert_eq!(covered, expected, "block {}", block.key);
        }
    }
}
