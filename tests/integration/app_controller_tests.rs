/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::path::PathBuf;

use subforge::app_config::Config;
use subforge::app_controller::Controller;
use subforge::formats::Format;
use subforge::Document;

use crate::common::{self, bounds, sample_document, SAMPLE_SRT};

fn create_controller() -> Controller {
    common::init_logging();
    Controller::with_config(Config::default()).unwrap()
}

#[test]
fn test_convert_withSingleFile_shouldWriteWebVttNextToInput() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;

    let summary = controller.convert(&input, None, None, Some(Format::WebVtt), false)?;

    let expected = temp_dir.path().join("episode.vtt");
    assert_eq!(summary.converted, vec![expected.clone()]);
    let written = std::fs::read_to_string(&expected)?;
    assert!(written.starts_with("WEBVTT"));
    assert!(written.contains("00:00:05.000 --> 00:00:09.000"));
    Ok(())
}

#[test]
fn test_convert_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let output = common::create_test_file(temp_dir.path(), "episode.ass", "keep me")?;

    let summary = controller.convert(&input, Some(&output), None, None, false)?;
    assert_eq!(summary.skipped, 1);
    assert_eq!(std::fs::read_to_string(&output)?, "keep me");

    let summary = controller.convert(&input, Some(&output), None, None, true)?;
    assert_eq!(summary.converted.len(), 1);
    assert!(std::fs::read_to_string(&output)?.contains("[Events]"));
    Ok(())
}

#[test]
fn test_convertFolder_shouldConvertNestedFilesAndSkipExisting() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    common::create_test_subtitle(temp_dir.path(), "season1/b.srt")?;
    common::create_test_file(temp_dir.path(), "c.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n")?;

    let first = controller.convert(temp_dir.path(), None, None, Some(Format::WebVtt), false)?;
    assert_eq!(first.converted.len(), 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.failed, 0);
    assert!(temp_dir.path().join("season1/b.vtt").exists());

    // a.vtt and season1/b.vtt now exist and are picked up as inputs too
    let second = controller.convert(temp_dir.path(), None, None, Some(Format::WebVtt), false)?;
    assert!(second.converted.is_empty());
    assert_eq!(second.skipped, 5);

    let forced = controller.convert(temp_dir.path(), None, None, Some(Format::WebVtt), true)?;
    assert_eq!(forced.converted.len(), 2);
    assert_eq!(forced.skipped, 3);
    Ok(())
}

#[test]
fn test_convertFolder_withOutputDir_shouldCollectOutputsThere() -> Result<()> {
    let controller = create_controller();
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_subtitle(input_dir.path(), "a.srt")?;
    common::create_test_file(input_dir.path(), "broken.vtt", "no header here")?;

    let summary = controller.convert(input_dir.path(), Some(output_dir.path()), None, Some(Format::Sami), false)?;

    assert_eq!(summary.converted, vec![output_dir.path().join("a.smi")]);
    assert_eq!(summary.failed, 1);
    Ok(())
}

#[test]
fn test_edit_withSelection_shouldShiftOnlySelectedCue() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("movie.edited.vtt");

    let document = controller.edit(
        &input,
        &output,
        &["shift=1000".to_string(), "case=upper".to_string()],
        Some("0"),
        None,
    )?;

    assert_eq!(bounds(&document), vec![(2000, 5000), (5000, 9000), (10000, 14000)]);
    assert_eq!(document.cues[0].joined_text(), "THIS IS A TEST SUBTITLE.");
    assert_eq!(document.cues[1].joined_text(), "It contains\nmultiple lines.");
    assert!(std::fs::read_to_string(&output)?.starts_with("WEBVTT"));
    assert_eq!(std::fs::read_to_string(&input)?, SAMPLE_SRT);
    Ok(())
}

#[test]
fn test_edit_withInvalidSelection_shouldNotWrite() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("out.srt");

    let result = controller.edit(&input, &output, &["shift=1000".to_string()], Some("9"), None);

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_edit_withSplitAt_shouldRefuseAndPointToSplit() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("out.srt");

    let error = controller
        .edit(&input, &output, &["split-at=1".to_string()], None, None)
        .unwrap_err();

    assert!(error.to_string().contains("split"));
    assert!(!output.exists());
    assert_eq!(std::fs::read_to_string(&input)?, SAMPLE_SRT);
    Ok(())
}

#[test]
fn test_merge_shouldAppendSecondFileOneSecondLater() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_subtitle(temp_dir.path(), "part1.srt")?;
    let second = common::create_test_subtitle(temp_dir.path(), "part2.srt")?;
    let output = temp_dir.path().join("full.srt");

    let merged = controller.merge(&first, &[second], &output, None)?;

    assert_eq!(merged.len(), 6);
    assert_eq!(
        bounds(&merged)[3..],
        [(16000, 19000), (20000, 24000), (25000, 29000)]
    );
    assert_eq!(merged.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);

    let (reloaded, _) = subforge::load_file(&output, None)?;
    assert_eq!(reloaded, merged);
    Ok(())
}

#[test]
fn test_split_shouldWriteHeadAndRebasedTail() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let head = temp_dir.path().join("head.srt");
    let tail = temp_dir.path().join("tail.vtt");

    let (head_doc, tail_doc) = controller.split(&input, 1, &head, &tail)?;

    assert_eq!(bounds(&head_doc), vec![(1000, 4000)]);
    assert_eq!(bounds(&tail_doc), vec![(0, 4000), (5000, 9000)]);
    assert!(std::fs::read_to_string(&tail)?.starts_with("WEBVTT"));

    assert!(controller.split(&input, 0, &head, &tail).is_err());
    assert!(controller.split(&input, 3, &head, &tail).is_err());
    Ok(())
}

#[test]
fn test_check_withOverlappingCues_shouldSuggestFixOverlaps() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "overlap.srt",
        "1\n00:00:01,000 --> 00:00:04,000\nFirst\n\n2\n00:00:03,000 --> 00:00:06,000\nSecond\n\n",
    )?;

    let report = controller.check(&input)?;

    assert!(!report.passed());
    assert_eq!(report.overlap_count, 1);
    assert!(report.suggested_transforms().contains(&"fix-overlaps"));

    let clean = common::create_test_subtitle(temp_dir.path(), "clean.srt")?;
    assert!(controller.check(&clean)?.passed());
    Ok(())
}

#[test]
fn test_show_shouldRenderSrtTextOrJson() -> Result<()> {
    let controller = create_controller();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    assert_eq!(controller.show(&input, false)?, SAMPLE_SRT);

    let json = controller.show(&input, true)?;
    let parsed: Document = serde_json::from_str(&json)?;
    assert_eq!(parsed, sample_document());
    Ok(())
}

#[test]
fn test_missingInput_shouldFailWithPathInMessage() {
    let controller = create_controller();
    let missing = PathBuf::from("/nonexistent/subforge/input.srt");

    let error = controller.convert(&missing, None, None, None, false).unwrap_err();
    assert!(format!("{:#}", error).contains("input.srt"));
    assert!(controller.show(&missing, false).is_err());
}
