//! HTML处理模块
//!
//! 提供HTML解析、元素查找、表格行提取和可见文本提取功能

// 第三方crate导入
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

// 本地模块导入
use crate::dict_error;
use crate::error::Result;

/// 产生换行的块级元素
const BLOCK_TAGS: &[&str] = &["p", "div", "tr", "li", "table", "h1", "h2", "h3", "h4", "h5", "h6"];

/// 解析HTML文档
pub fn parse_html(html: &str) -> Result<RcDom> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| dict_error!(html_parse, format!("{:?}", e)))
}

/// 读取元素属性
pub fn attr_value(node: &Handle, attr_name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 元素的class属性是否包含指定类名
pub fn has_class(node: &Handle, class: &str) -> bool {
    attr_value(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

fn is_tag(node: &Handle, tag: &str) -> bool {
    match node.data {
        NodeData::Element { ref name, .. } => name.local.as_ref() == tag,
        _ => false,
    }
}

/// 按文档顺序查找满足条件的所有后代节点（不含根节点本身）
pub fn find_all<F>(root: &Handle, predicate: F) -> Vec<Handle>
where
    F: Fn(&Handle) -> bool,
{
    let mut found = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();

    while let Some(node) = stack.pop() {
        if predicate(&node) {
            found.push(node.clone());
        }
        for child in node.children.borrow().iter().rev() {
            stack.push(child.clone());
        }
    }

    found
}

/// 查找`tag.class`形式的元素
pub fn select(root: &Handle, tag: &str, class: Option<&str>) -> Vec<Handle> {
    find_all(root, |node| {
        is_tag(node, tag) && class.map_or(true, |c| has_class(node, c))
    })
}

/// 查找`tag[name=...]`形式的第一个元素
pub fn find_by_name(root: &Handle, tag: &str, name: &str) -> Option<Handle> {
    find_all(root, |node| {
        is_tag(node, tag) && attr_value(node, "name").as_deref() == Some(name)
    })
    .into_iter()
    .next()
}

fn collect_text(node: &Handle, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => {
            out.push_str(&contents.borrow());
        }
        NodeData::Element { ref name, .. } => {
            let tag = name.local.as_ref();
            if matches!(tag, "script" | "style" | "noscript") {
                return;
            }
            if tag == "br" {
                out.push('\n');
                return;
            }
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
            if BLOCK_TAGS.contains(&tag) {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// 提取节点的可见文本
///
/// 每行内部的空白压缩为单个空格，首尾空行去掉，中间的空行保留
pub fn text_content(node: &Handle) -> String {
    let mut raw = String::new();
    collect_text(node, &mut raw);

    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// 统计节点到容器之间的table祖先层数，同时收集`tr`行
fn collect_rows(node: &Handle, table_depth: usize, min_depth: usize, rows: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        let depth = if is_tag(child, "table") {
            table_depth + 1
        } else {
            table_depth
        };
        if is_tag(child, "tr") && depth >= min_depth {
            rows.push(child.clone());
        }
        collect_rows(child, depth, min_depth, rows);
    }
}

/// 提取容器内嵌套至少`min_depth`层table的表格行，每行返回其`td`单元格文本
///
/// 对应CSS选择器`<container_tag>.<container_class> table table tr`（min_depth为2时）
pub fn nested_table_rows(
    root: &Handle,
    container_tag: &str,
    container_class: &str,
    min_depth: usize,
) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for container in select(root, container_tag, Some(container_class)) {
        collect_rows(&container, 0, min_depth, &mut rows);
    }

    rows.iter()
        .map(|row| {
            row.children
                .borrow()
                .iter()
                .filter(|cell| is_tag(cell, "td") || is_tag(cell, "th"))
                .map(text_content)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r##"<html><body>
        <select name="pgInd"><option>1</option><option>2</option><option>3</option></select>
        <div class="words">
            <a class="word" href="#">અ</a>
            <a class="word other" href="#">અંક</a>
            <a class="link" href="#">skip</a>
        </div>
    </body></html>"##;

    const DEFINITION_PAGE: &str = r#"<html><body>
        <div class="right_middle">
          <table><tr><td>
            <table>
              <tr><th>a</th><th>b</th><th>c</th><th>d</th></tr>
              <tr><td>અંક</td><td>પું.</td><td>x</td><td>સંખ્યા.<br><br>આંકડો</td></tr>
            </table>
          </td></tr></table>
        </div>
        <table><tr><td><table><tr><td>outside</td></tr></table></td></tr></table>
    </body></html>"#;

    #[test]
    fn test_select_by_class() {
        let dom = parse_html(LIST_PAGE).unwrap();
        let words: Vec<String> = select(&dom.document, "a", Some("word"))
            .iter()
            .map(text_content)
            .collect();
        assert_eq!(words, vec!["અ", "અંક"]);
    }

    #[test]
    fn test_find_by_name() {
        let dom = parse_html(LIST_PAGE).unwrap();
        let dropdown = find_by_name(&dom.document, "select", "pgInd").unwrap();
        assert_eq!(select(&dropdown, "option", None).len(), 3);
        assert!(find_by_name(&dom.document, "select", "missing").is_none());
    }

    #[test]
    fn test_nested_table_rows() {
        let dom = parse_html(DEFINITION_PAGE).unwrap();
        let rows = nested_table_rows(&dom.document, "div", "right_middle", 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b", "c", "d"]);
        assert_eq!(rows[1][0], "અંક");
        assert_eq!(rows[1][3], "સંખ્યા.\n\nઆંકડો");
    }

    #[test]
    fn test_text_content_skips_script() {
        let dom = parse_html("<div> hello <script>var x;</script><b>world</b> </div>").unwrap();
        assert_eq!(text_content(&dom.document), "hello world");
    }

    #[test]
    fn test_attr_value() {
        let dom = parse_html(r#"<a class="word x" href="/w">w</a>"#).unwrap();
        let links = select(&dom.document, "a", None);
        assert_eq!(attr_value(&links[0], "href").as_deref(), Some("/w"));
        assert!(has_class(&links[0], "x"));
        assert!(!has_class(&links[0], "wor"));
    }
}
