use anyhow::Result;
use elasticflow::{
    FieldMapper, Q, QueryStringBuilder, QueryStringOperator, QueryStringTransformer,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// 创建转换器实例，优先使用JSON字段映射配置，失败时不启用映射
fn build_transformer() -> QueryStringTransformer {
    match FieldMapper::from_json_file("field_mapping.json") {
        Ok(mapper) => {
            println!("✅ 成功从JSON配置文件加载字段映射");
            println!("配置详情:");
            for (external, indexed) in mapper.mappings() {
                println!("  {} -> {}", external, indexed);
            }
            QueryStringTransformer::new().with_field_mapper(mapper)
        }
        Err(e) => {
            println!("⚠️ 无法加载JSON配置文件 ({}), 不启用字段映射", e);
            QueryStringTransformer::new()
        }
    }
}

fn main() -> Result<()> {
    println!("--- elasticflow: 条件表达式到 Query String 编译器 ---");

    println!("\n[配置信息]:");
    let transformer = build_transformer();

    // 1. 示例表达式
    let expression = r#"status = ("error", "warning"); level >= 3 AND trace_id exists"#;
    println!("\n[输入表达式]:\n{}\n", expression);

    // 2. 转换为 Query String
    println!("[步骤 1]: 转换为 Query String...");
    match transformer.transform(expression) {
        Ok(query_string) => println!("✅ {}", query_string),
        Err(e) => println!("✗ 转换失败: {}", e),
    }

    // 3. 转换为 DSL bool 查询
    println!("\n[步骤 2]: 转换为 DSL bool 查询...");
    match transformer.transform_to_dsl(expression) {
        Ok(dsl) => println!("{}", serde_json::to_string_pretty(&dsl)?),
        Err(e) => println!("✗ 转换失败: {}", e),
    }

    // 4. Q 表达式组合演示
    println!("\n[步骤 3]: Q 表达式组合演示...");
    let q = (Q::expr("status__equal", "error") | Q::expr("status__equal", "warning"))
        & Q::expr("level__gte", 3);
    println!("组合结果: {}", q.build()?);

    let mut builder = QueryStringBuilder::new();
    builder
        .add_filter("app", QueryStringOperator::Equal, ["myapp"])
        .add_q(&q);
    println!("叠加应用过滤: {}", builder.build()?);

    // 5. 交互模式
    println!("\n--- 交互模式 ---");
    println!("输入条件表达式，:dsl 切换DSL输出，:quit 或 Ctrl-D 退出");
    repl(&transformer)
}

fn repl(transformer: &QueryStringTransformer) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut show_dsl = false;

    loop {
        match rl.readline("elasticflow> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match line.as_str() {
                    ":quit" | ":q" => break,
                    ":dsl" => {
                        show_dsl = !show_dsl;
                        println!("DSL 输出: {}", if show_dsl { "开" } else { "关" });
                        continue;
                    }
                    _ => {}
                }

                match transformer.transform(&line) {
                    Ok(query_string) if query_string.is_empty() => println!("(空查询)"),
                    Ok(query_string) => {
                        println!("{}", query_string);
                        if show_dsl {
                            match transformer.transform_to_dsl(&line) {
                                Ok(dsl) => println!("{}", serde_json::to_string_pretty(&dsl)?),
                                Err(e) => println!("✗ {}", e),
                            }
                        }
                    }
                    Err(e) => println!("✗ {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
