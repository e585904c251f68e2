/*!
 * Tests for the per-format codecs
 */

use subforge::errors::{FormatError, ImportError};
use subforge::formats::{CodecOptions, Format, SubtitleCodec};
use subforge::subtitle_processor::{self, load_with, Document};
use subforge::{load, save, Cue};

fn texts(document: &Document) -> Vec<String> {
    document.iter().map(|cue| cue.joined_text()).collect()
}

#[test]
fn test_formatTable_shouldMapNamesAndExtensions() {
    for format in Format::ALL {
        assert_eq!(format.codec().format(), format);
        assert_eq!(format.name().parse::<Format>().unwrap(), format);
    }
    assert_eq!(Format::from_extension("SRT"), Some(Format::Srt));
    assert_eq!(Format::from_extension("smi"), Some(Format::Sami));
    assert_eq!(Format::from_extension("sub"), Some(Format::SubViewer));
    assert_eq!(Format::from_extension("mkv"), None);
    assert!(matches!("docx".parse::<Format>(), Err(ImportError::UnknownFormat(_))));
}

#[test]
fn test_srt_withMalformedBlocks_shouldSkipThemAndKeepTheRest() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nGood\n\n\
                   x\n00:00:03,000 --> 00:00:04,000\nBad index\n\n\
                   3\nnot a timing line\nBad timing\n\n\
                   4\n00:00:05,000 --> 00:00:06,000\nAlso good\n";
    let document = load(content, Format::Srt).unwrap();

    assert_eq!(texts(&document), vec!["Good", "Also good"]);
    assert_eq!(document.cues[1].index, 4);
}

#[test]
fn test_srt_withCrlfAndBom_shouldDecode() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nLine one\r\nLine two\r\n\r\n";
    let document = load(content, Format::Srt).unwrap();

    assert_eq!(document.cues, vec![Cue::from_millis(1, 1000, 2000, "Line one\nLine two")]);
}

#[test]
fn test_webvtt_withoutHeader_shouldFailImport() {
    let result = load("00:00:01.000 --> 00:00:02.000\nHi\n", Format::WebVtt);
    assert!(matches!(result, Err(ImportError::Format(FormatError::MissingHeader { .. }))));
}

#[test]
fn test_webvtt_withNotesAndSettings_shouldKeepOnlyCues() {
    let content = "WEBVTT - title\n\n\
                   NOTE this is a comment\n\n\
                   STYLE\n::cue { color: red }\n\n\
                   intro\n00:01.000 --> 00:02.500 align:start\nHello\n\n\
                   00:00:03.000 --> 00:00:04.000\nWorld\n";
    let document = load(content, Format::WebVtt).unwrap();

    assert_eq!(texts(&document), vec!["Hello", "World"]);
    assert_eq!(document.cues[0].start.as_millis(), 1000);
    assert_eq!(document.cues[0].end.as_millis(), 2500);
    assert_eq!(document.cues[1].index, 2);
}

#[test]
fn test_webvtt_encode_shouldWriteHeaderAndDotTimes() {
    let document = Document::from_cues(vec![Cue::from_millis(1, 1000, 2500, "Hi")]);
    let encoded = save(&document, Format::WebVtt);

    assert!(encoded.starts_with("WEBVTT\n\n"));
    assert!(encoded.contains("00:00:01.000 --> 00:00:02.500\nHi\n"));
}

#[test]
fn test_ssa_withCommasInText_shouldKeepWholeText() {
    let content = "[Script Info]\nScriptType: v4.00+\n\n[Events]\n\
                   Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
                   Dialogue: 0,0:00:01.50,0:00:03.00,Default,,0,0,0,,Well, hello,\\Nthere\n";
    let document = load(content, Format::Ass).unwrap();

    assert_eq!(document.len(), 1);
    assert_eq!(document.cues[0].start.as_millis(), 1500);
    assert_eq!(document.cues[0].text, vec!["Well, hello,", "there"]);
}

#[test]
fn test_ssaAndAss_encode_shouldUseVariantHeaders() {
    let document = Document::from_cues(vec![Cue::from_millis(1, 1234, 5678, "a\nb")]);

    let ssa = save(&document, Format::Ssa);
    let ass = save(&document, Format::Ass);

    assert!(ssa.contains("[V4 Styles]"));
    assert!(ass.contains("[V4+ Styles]"));
    // Centiseconds are truncated
    assert!(ass.contains("0:00:01.23,0:00:05.67"));
    assert!(ass.contains("a\\Nb"));
}

#[test]
fn test_microdvd_withDeclaredFrameRate_shouldOverrideDefault() {
    let document = load("{1}{1}25\n{25}{50}Hello|world\n", Format::MicroDvd).unwrap();

    assert_eq!(document.len(), 1);
    assert_eq!(document.cues[0].start.as_millis(), 1000);
    assert_eq!(document.cues[0].end.as_millis(), 2000);
    assert_eq!(document.cues[0].text, vec!["Hello", "world"]);
}

#[test]
fn test_microdvd_withCodecOptions_shouldUseConfiguredRate() {
    let options = CodecOptions {
        microdvd_frame_rate: 50.0,
        ..CodecOptions::default()
    };
    let document = load_with("{50}{100}Hi\n", Format::MicroDvd, &options).unwrap();

    assert_eq!(document.cues[0].start.as_millis(), 1000);
    assert_eq!(subtitle_processor::save_with(&document, Format::MicroDvd, &options), "{50}{100}Hi\n");
}

#[test]
fn test_sami_shouldDecodeEntitiesAndBreaks() {
    let content = "<SAMI><BODY>\n\
                   <SYNC Start=1000><P Class=ENCC>Tom &amp; Jerry<br>go home</P>\n\
                   <SYNC Start=2000><P Class=ENCC>&nbsp;</P>\n\
                   </BODY></SAMI>";
    let document = load(content, Format::Sami).unwrap();

    assert_eq!(document.cues, vec![Cue::from_millis(1, 1000, 2000, "Tom & Jerry\ngo home")]);
}

#[test]
fn test_sami_withCustomTrailingDuration_shouldExtendLastCue() {
    let options = CodecOptions {
        sami_last_cue_duration_ms: 500,
        ..CodecOptions::default()
    };
    let document = load_with("<SYNC Start=100><P>Last</P>", Format::Sami, &options).unwrap();

    assert_eq!(document.cues[0].end.as_millis(), 600);
}

#[test]
fn test_subviewer_shouldUsePipeForLineBreaks() {
    let document = Document::from_cues(vec![Cue::from_millis(1, 1000, 2000, "one\ntwo")]);
    let encoded = save(&document, Format::SubViewer);

    assert!(encoded.starts_with("[INFORMATION]"));
    assert!(encoded.contains("00:00:01.000,00:00:02.000\none|two\n"));
    assert_eq!(load(&encoded, Format::SubViewer).unwrap(), document);
}
