use super::*;
use crate::filter::position_marker;
use pretty_assertions::assert_eq;

fn minify(src: &str) -> String {
    String::from_utf8_lossy(&remove_whitespace(src.as_bytes(), true)).into_owned()
}

#[test]
fn disabled_borrows_input() {
    let src = b"var x = 1;\n";
    assert!(matches!(remove_whitespace(src, false), Cow::Borrowed(s) if s == src));
}

#[test]
fn drops_layout_whitespace() {
    assert_eq!(
        minify("\t$init = function() {\n\t\t$pkg.$init = function() {};\n"),
        "$init=function(){$pkg.$init=function(){};"
    );
}

#[test]
fn keeps_space_between_identifiers() {
    assert_eq!(minify("\tvar $pkg = {}, $init;\n"), "var $pkg={},$init;");
    assert_eq!(minify("return  $pkg;"), "return $pkg;");
    assert_eq!(minify("typeof\n\tx"), "typeof x");
}

#[test]
fn keeps_space_between_repeated_signs() {
    assert_eq!(minify("a + +b"), "a+ +b");
    assert_eq!(minify("a - -b"), "a- -b");
    assert_eq!(minify("a + -b"), "a+-b");
}

#[test]
fn string_literals_untouched() {
    assert_eq!(
        minify(r#"$packages["my pkg"] = x + 'a  b' + "q\" r";"#),
        r#"$packages["my pkg"]=x+'a  b'+"q\" r";"#
    );
}

#[test]
fn block_comments_removed() {
    assert_eq!(minify("var /* slot */ $f, $s; /* end */"), "var $f,$s;");
    assert_eq!(minify("a/*x*/b"), "a b");
}

#[test]
fn markers_copied_verbatim() {
    let marker = position_marker(0x0a20_0920);
    let mut src = b"x = ".to_vec();
    src.extend_from_slice(&marker);
    src.extend_from_slice(b" 1;");

    let out = remove_whitespace(&src, true);
    let mut expected = b"x=".to_vec();
    expected.extend_from_slice(&marker);
    expected.extend_from_slice(b"1;");
    assert_eq!(out.as_ref(), expected.as_slice());
}

#[test]
fn unterminated_literal_runs_to_end() {
    assert_eq!(minify("x = \"abc  "), "x=\"abc  ");
}
