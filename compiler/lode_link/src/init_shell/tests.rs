use super::*;
use pretty_assertions::assert_eq;

#[test]
fn standard_open() {
    assert_eq!(
        InitShell::STANDARD.open(),
        "\t$init = function() {\n\t\t$pkg.$init = function() {};\n\t\tvar $f, $c = false, $s = 0, $r; \
         if (this !== undefined && this.$blk !== undefined) { $f = this; $c = true; $s = $f.$s; $r = $f.$r; } \
         s: while (true) { switch ($s) { case 0:\n"
    );
}

#[test]
fn standard_close() {
    assert_eq!(
        InitShell::default().close(),
        "\t\t} return; } if ($f === undefined) { $f = { $blk: $init }; } \
         $f.$s = $s; $f.$r = $r; return $f;\n\t};\n"
    );
}

#[test]
fn custom_slot_names() {
    let shell = InitShell {
        frame: "$frame",
        step: "$step",
        result: "$res",
    };
    let open = shell.open();
    assert!(open.contains("var $frame, $c = false, $step = 0, $res;"));
    assert!(open.contains("switch ($step)"));
    assert!(shell
        .close()
        .contains("$frame.$s = $step; $frame.$r = $res; return $frame;"));
}
