use cobmap::analyzers::orm::analyze_orm_config;
use cobmap::MapperKind;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::Path;

fn analyze(content: &str) -> cobmap::OrmAnalysisResult {
    analyze_orm_config(Path::new("mapper.xml"), content)
}

#[test]
fn mybatis_mapper_detected_and_statements_extracted() {
    let content = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <mapper namespace="com.example.CustomerMapper">
          <resultMap id="customerMap" type="Customer"/>
          <select id="findRecent" resultMap="customerMap">
            SELECT * FROM customers ORDER BY created_at DESC LIMIT 10 OFFSET 5
          </select>
          <insert id="insertCustomer">
            INSERT INTO customers (name) VALUES (#{name}) RETURNING id
          </insert>
        </mapper>
    "#};

    let result = analyze(content);
    assert_eq!(result.mapper_kind, MapperKind::MyBatis);
    assert_eq!(result.statements.len(), 2);
    assert_eq!(result.result_map_count, 1);

    let select = &result.statements[0];
    assert_eq!(select.id, "findRecent");
    assert_eq!(select.statement_kind, "select");
    assert!(select.postgresql_dependent);
    assert!(select
        .postgresql_features
        .contains(&"LIMIT clause".to_string()));
    assert!(select
        .postgresql_features
        .contains(&"OFFSET clause".to_string()));

    let insert = &result.statements[1];
    assert!(insert
        .postgresql_features
        .contains(&"RETURNING clause".to_string()));
}

#[test]
fn mybatis_dynamic_sql_and_type_handlers_counted() {
    let content = indoc! {r#"
        <mapper namespace="m">
          <resultMap id="r" type="T">
            <result column="tags" property="tags"
                    typeHandler="com.example.JsonbTypeHandler"/>
          </resultMap>
          <select id="search">
            SELECT * FROM t
            <where>
              <if test="name != null">name = #{name}</if>
              <foreach item="id" collection="ids">#{id}</foreach>
            </where>
          </select>
        </mapper>
    "#};

    let result = analyze(content);
    assert_eq!(result.dynamic_sql_count, 3);
    assert_eq!(
        result.type_handlers,
        vec!["com.example.JsonbTypeHandler".to_string()]
    );
}

#[test]
fn jpa_named_query_with_cdata() {
    let content = indoc! {r#"
        <entity-mappings>
          <named-query name="Customer.findByRegion">
            <query><![CDATA[
              SELECT c FROM Customer c WHERE c.region ILIKE :region
            ]]></query>
          </named-query>
        </entity-mappings>
    "#};

    let result = analyze(content);
    assert_eq!(result.mapper_kind, MapperKind::Jpa);
    assert_eq!(result.statements.len(), 1);
    let stmt = &result.statements[0];
    assert_eq!(stmt.id, "Customer.findByRegion");
    assert!(stmt
        .postgresql_features
        .contains(&"ILIKE operator".to_string()));
    assert!(!stmt.sql.contains("CDATA"));
}

#[test]
fn hibernate_queries_extracted() {
    let content = indoc! {r#"
        <hibernate-mapping>
          <sql-query name="upsertAccount"><![CDATA[
            INSERT INTO accounts (id, bal) VALUES (?, ?)
            ON CONFLICT (id) DO UPDATE SET bal = EXCLUDED.bal
          ]]></sql-query>
          <query>FROM Account a WHERE a.meta @> :fragment</query>
        </hibernate-mapping>
    "#};

    let result = analyze(content);
    assert_eq!(result.mapper_kind, MapperKind::Hibernate);
    assert_eq!(result.statements.len(), 2);
    assert_eq!(result.statements[0].id, "upsertAccount");
    assert!(result.statements[0]
        .postgresql_features
        .contains(&"ON CONFLICT clause".to_string()));
    assert_eq!(result.statements[1].id, "query-2");
    assert!(result.statements[1]
        .postgresql_features
        .contains(&"JSONB containment operator @>".to_string()));
}

#[test]
fn unknown_xml_yields_empty_result() {
    let result = analyze("<project><build/></project>");
    assert_eq!(result.mapper_kind, MapperKind::Unknown);
    assert!(result.statements.is_empty());
    assert_eq!(result.result_map_count, 0);
    assert!(result.type_handlers.is_empty());
}

#[test]
fn entities_unescaped_before_feature_scan() {
    let content = indoc! {r#"
        <mapper namespace="m">
          <select id="byAge">
            SELECT * FROM t WHERE age &lt; #{age} LIMIT 1
          </select>
        </mapper>
    "#};

    let result = analyze(content);
    let stmt = &result.statements[0];
    assert!(stmt.sql.contains("age <"));
    assert!(stmt.postgresql_dependent);
}

#[test]
fn postgresql_function_and_type_usage_flagged() {
    let content = indoc! {r#"
        <mapper namespace="m">
          <select id="nextId">
            SELECT NEXTVAL('order_seq')::BIGINT, payload::JSONB FROM dual
          </select>
        </mapper>
    "#};

    let result = analyze(content);
    let features = &result.statements[0].postgresql_features;
    assert!(features.contains(&"PostgreSQL function NEXTVAL".to_string()));
    assert!(features.contains(&"PostgreSQL data type JSONB".to_string()));
}
