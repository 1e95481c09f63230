//! Pure edit operations. Each takes a document snapshot and returns a new one.

use std::collections::BTreeSet;

use crate::document::{CharacterMetadata, ContentBlock, ContentState, EditorState, SelectionState};
use crate::error::EditorError;

/// Add `style` to every selected character
pub fn apply_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState, EditorError> {
    modify_selected_styles(content, selection, |styles| {
        styles.insert(style.to_string());
    })
}

/// Remove `style` from every selected character
pub fn remove_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState, EditorError> {
    modify_selected_styles(content, selection, |styles| {
        styles.remove(style);
    })
}

/// Whether every selected character carries `style`. A collapsed selection has no styles.
pub fn selection_has_style(
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<bool, EditorError> {
    let range = selection.resolve(content)?;
    if range.is_collapsed() {
        return Ok(false);
    }
    let mut selected = content.blocks.iter().enumerate().filter_map(|(index, block)| {
        range
            .range_in_block(index, block.len())
            .map(|chars| &block.characters[chars])
    });
    Ok(selected.all(|chars| chars.iter().all(|character| character.has_style(style))))
}

/// Apply `style` to the selection, or remove it when the whole selection already has it.
/// Recorded as an undoable edit; a collapsed selection leaves the state unchanged.
pub fn toggle_inline_style(state: &EditorState, style: &str) -> Result<EditorState, EditorError> {
    let content = state.content();
    let selection = state.selection();
    if selection.resolve(content)?.is_collapsed() {
        return Ok(state.clone());
    }
    let next = if selection_has_style(content, selection, style)? {
        remove_inline_style(content, selection, style)?
    } else {
        apply_inline_style(content, selection, style)?
    };
    Ok(state.push(next, selection.clone()))
}

fn modify_selected_styles<F>(
    content: &ContentState,
    selection: &SelectionState,
    mut modify: F,
) -> Result<ContentState, EditorError>
where
    F: FnMut(&mut BTreeSet<String>),
{
    let range = selection.resolve(content)?;
    let mut next = content.clone();
    for (index, block) in next.blocks.iter_mut().enumerate() {
        if let Some(chars) = range.range_in_block(index, block.len()) {
            for character in &mut block.characters[chars] {
                modify(&mut character.styles);
            }
        }
    }
    Ok(next)
}

/// Delete the selected range, merging the first and last selected blocks
pub fn remove_range(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<(ContentState, SelectionState), EditorError> {
    let range = selection.resolve(content)?;
    let start = &content.blocks[range.start_block];
    let caret = SelectionState::collapsed(start.key.clone(), range.start_offset);
    if range.is_collapsed() {
        return Ok((content.clone(), caret));
    }

    let end = &content.blocks[range.end_block];
    let mut merged = start.clone();
    merged.text = format!(
        "{}{}",
        &start.text[..start.byte_index(range.start_offset)],
        &end.text[end.byte_index(range.end_offset)..]
    );
    merged.characters = start.characters[..range.start_offset]
        .iter()
        .chain(&end.characters[range.end_offset..])
        .cloned()
        .collect();

    let mut next = content.clone();
    next.blocks
        .splice(range.start_block..=range.end_block, [merged]);
    Ok((next, caret))
}

/// Backspace: delete the selection, or the character before a collapsed
/// caret, joining with the previous block at a block start
pub fn remove_backward(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<(ContentState, SelectionState), EditorError> {
    let range = selection.resolve(content)?;
    if !range.is_collapsed() {
        return remove_range(content, selection);
    }
    let block = &content.blocks[range.start_block];
    if range.start_offset > 0 {
        let target =
            SelectionState::within(block.key.clone(), range.start_offset - 1, range.start_offset);
        return remove_range(content, &target);
    }
    if range.start_block > 0 {
        let previous = &content.blocks[range.start_block - 1];
        let target = SelectionState::new(previous.key.clone(), previous.len(), block.key.clone(), 0);
        return remove_range(content, &target);
    }
    Ok((content.clone(), selection.clone()))
}

/// Replace the selection with `text`. Inserted characters inherit the styles
/// of the character before the caret (or the first character at offset 0),
/// never its entity.
pub fn insert_text(
    content: &ContentState,
    selection: &SelectionState,
    text: &str,
) -> Result<(ContentState, SelectionState), EditorError> {
    let (mut next, caret) = remove_range(content, selection)?;
    let index = next
        .block_index(&caret.focus_key)
        .ok_or_else(|| EditorError::UnknownBlock(caret.focus_key.clone()))?;
    let block = &mut next.blocks[index];
    let offset = caret.focus_offset.min(block.len());

    let inherited = match offset {
        0 => block.characters.first(),
        _ => block.characters.get(offset - 1),
    }
    .map(|character| CharacterMetadata {
        styles: character.styles.clone(),
        entity: None,
    })
    .unwrap_or_default();

    let inserted = text.chars().count();
    let byte = block.byte_index(offset);
    block.text.insert_str(byte, text);
    block.characters.splice(
        offset..offset,
        std::iter::repeat_n(inherited, inserted),
    );

    let caret = SelectionState::collapsed(block.key.clone(), offset + inserted);
    Ok((next, caret))
}

/// Enter: delete the selection, then split the caret's block in two. The new
/// block gets a fresh key and keeps the type and depth of the original.
pub fn split_block(
    content: &ContentState,
    selection: &SelectionState,
) -> Result<(ContentState, SelectionState), EditorError> {
    let (mut next, caret) = remove_range(content, selection)?;
    let index = next
        .block_index(&caret.focus_key)
        .ok_or_else(|| EditorError::UnknownBlock(caret.focus_key.clone()))?;
    let new_key = next.fresh_block_key();

    let block = &mut next.blocks[index];
    let offset = caret.focus_offset.min(block.len());
    let byte = block.byte_index(offset);

    let tail = ContentBlock {
        key: new_key.clone(),
        block_type: block.block_type.clone(),
        text: block.text.split_off(byte),
        depth: block.depth,
        characters: block.characters.split_off(offset),
        data: serde_json::Map::new(),
    };
    next.blocks.insert(index + 1, tail);

    Ok((next, SelectionState::collapsed(new_key, 0)))
}
