use swc_core::common::{FileName, Globals, Mark, SourceMap, GLOBALS};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_core::ecma::transforms::base::resolver;
use swc_core::ecma::visit::VisitMutWith;

pub fn syntax_for_filename(filename: &str) -> Syntax {
  if filename.ends_with(".ts") || filename.ends_with(".tsx") || filename.ends_with(".mts") {
    Syntax::Typescript(TsSyntax {
      tsx: filename.ends_with(".tsx"),
      decorators: true,
      ..Default::default()
    })
  } else {
    Syntax::Es(EsSyntax {
      jsx: true,
      decorators: true,
      ..Default::default()
    })
  }
}

/// Parses `code` as an ES module, registering it with `source_map` under `filename`.
pub fn parse_module(source_map: &SourceMap, filename: &str, code: &str) -> Result<Module, String> {
  let file = source_map.new_source_file(FileName::Custom(filename.into()).into(), code.into());
  let lexer = Lexer::new(
    syntax_for_filename(filename),
    EsVersion::Es2022,
    StringInput::from(&*file),
    None,
  );
  let mut parser = Parser::new_from(lexer);
  let module = parser
    .parse_module()
    .map_err(|error| format!("{:?}", error.kind()))?;

  if let Some(error) = parser.take_errors().into_iter().next() {
    return Err(format!("{:?}", error.kind()));
  }
  Ok(module)
}

/// Runs the swc resolver so every binding gets a unique syntax context.
pub fn resolve_module(module: &mut Module, typescript: bool) {
  GLOBALS.set(&Globals::new(), || {
    let global_mark = Mark::new();
    let unresolved_mark = Mark::new();
    module.visit_mut_with(&mut resolver(unresolved_mark, global_mark, typescript));
  });
}
